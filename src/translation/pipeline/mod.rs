/*!
 * Four-phase document pipeline.
 *
 * 1. **Harvest**: spans and table cells into an ordered queue
 * 2. **Route**: deduplicate, bypass numeric/symbolic strings
 * 3. **Translate**: batch the natural-language subset through the model
 * 4. **Scatter**: cover and redraw every queue entry at its location
 */

pub mod orchestrator;
pub mod queue;
pub mod stats;

pub use orchestrator::{
    PipelineConfig, PipelinePhase, PipelineProgress, PipelineResult, ProgressCallback, Segment,
    SegmentKind, TranslationPipeline,
};
pub use queue::{
    LocationRef, ResolvedString, Route, TranslationQueue, TranslationQueueEntry, UniqueStringMap,
};
pub use stats::DocumentStats;
