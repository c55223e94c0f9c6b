/*!
 * Translation of harvested financial text.
 *
 * - `router`: numeric/symbolic bypass classification
 * - `normalizer`: cleaning before inference
 * - `segmenter`: sentence units for long strings
 * - `batch`: batched inference with retry strategies
 * - `quality`: output validation
 * - `glossary`: financial terminology corrections
 * - `core`: the shared model service
 * - `pipeline`: the four-phase document pipeline
 */

pub use self::batch::{BatchOptions, BatchOutcome, BatchTranslator};
pub use self::core::{ModelService, ServiceOptions};
pub use self::glossary::FinancialGlossary;
pub use self::router::{Classification, Router};

pub mod batch;
pub mod cache;
pub mod core;
pub mod glossary;
pub mod normalizer;
pub mod pipeline;
pub mod quality;
pub mod router;
pub mod segmenter;
