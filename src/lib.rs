/*!
 * # finlate - layout-preserving translation of Arabic financial documents
 *
 * Takes the page layout extracted from an Arabic financial PDF (text spans,
 * table cells, OCR words) and produces English cover-and-draw instructions
 * placed at the original coordinates.
 *
 * ## Pipeline
 *
 * 1. Harvest every span and table cell into an ordered queue
 * 2. Deduplicate and route numeric/symbolic strings around the model
 * 3. Translate the natural-language subset in batches, with validation and retries
 * 4. Scatter the translations back onto the page with font fitting
 *
 * ## Architecture
 *
 * - `layout`: document, page, span and rectangle types
 * - `harvest`: text-layer and OCR harvesting, table classification
 * - `translation`: routing, cleaning, batching, validation, glossary, pipeline
 * - `render`: font metrics, fitting and render plans
 * - `providers`: translation model backends (HTTP, mock)
 * - `app_config`: configuration management
 * - `app_controller`: file and folder workflows
 * - `file_utils`: file system operations
 * - `language_utils`: ISO language code utilities
 * - `script_utils`: Arabic script character classes
 * - `errors`: custom error types
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod harvest;
pub mod language_utils;
pub mod layout;
pub mod providers;
pub mod render;
pub mod script_utils;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, TranslationReport};
pub use errors::{AppError, ExtractionError, ModelError, PipelineError};
pub use layout::{LayoutDocument, LayoutPage, Rect, TextSpan};
pub use render::{RenderOp, RenderPlan};
pub use translation::pipeline::{DocumentStats, PipelineConfig, PipelineResult, TranslationPipeline};
pub use translation::{ModelService, ServiceOptions};
