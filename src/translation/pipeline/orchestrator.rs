/*!
 * Pipeline orchestrator for one layout document.
 *
 * The orchestrator runs the four phases in order:
 * 1. Harvest: text spans and table cells into the translation queue
 * 2. Route: deduplicate and split numeric content from natural language
 * 3. Translate: batch inference over the natural-language subset
 * 4. Scatter: cover and draw ops at the recorded locations
 */

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::harvest::{HarvestOptions, Harvester, OcrEngine, PrecomputedOcr, TableClassifier};
use crate::layout::{LayoutDocument, PageGeometry};
use crate::render::{CoverColor, FitOptions, LayoutOptions, RenderPlan, Scatter};
use crate::translation::batch::{BatchOptions, BatchTranslator};
use crate::translation::core::ModelService;
use crate::translation::glossary::FinancialGlossary;
use crate::translation::router::{Classification, DEFAULT_BYPASS_PATTERN, Router};

use super::queue::{Route, TranslationQueue, UniqueStringMap};
use super::stats::DocumentStats;

/// Configuration for the translation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub harvest: HarvestOptions,

    /// Whitelist pattern for the bypass route
    pub bypass_pattern: String,

    pub batch: BatchOptions,

    pub layout: LayoutOptions,

    /// Glossary entries added to the built-in financial terms
    pub extra_glossary_terms: HashMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            harvest: HarvestOptions::default(),
            bypass_pattern: DEFAULT_BYPASS_PATTERN.to_string(),
            batch: BatchOptions::default(),
            layout: LayoutOptions::default(),
            extra_glossary_terms: HashMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Map the application configuration onto pipeline options
    pub fn from_config(config: &Config) -> Result<Self> {
        let cover_color = CoverColor::from_hex(&config.layout.cover_color).with_context(|| {
            format!("Invalid cover colour '{}'", config.layout.cover_color)
        })?;

        Ok(Self {
            harvest: HarvestOptions {
                min_ocr_confidence: config.harvest.min_ocr_confidence,
                ocr_line_tolerance: config.harvest.ocr_line_tolerance,
                table_classifier: TableClassifier::new(
                    config.harvest.max_words_per_cell,
                    config.harvest.min_numeric_ratio,
                ),
            },
            bypass_pattern: config.routing.bypass_pattern.clone(),
            batch: BatchOptions {
                batch_size: config.translation.batch_size,
                max_unit_chars: config.translation.max_unit_chars,
                strategies: config.translation.strategies.clone(),
                max_repeated_token_run: config.translation.max_repeated_token_run,
                fold_letter_variants: config.routing.fold_letter_variants,
            },
            layout: LayoutOptions {
                fit: FitOptions {
                    min_font_size: config.layout.min_font_size,
                    max_font_size: config.layout.max_font_size,
                    font_step: config.layout.font_step,
                    line_spacing: config.layout.line_spacing,
                },
                prose_size_factor: config.layout.prose_size_factor,
                table_size_factor: config.layout.table_size_factor,
                cover_color,
            },
            extra_glossary_terms: config.glossary.extra_terms.clone(),
        })
    }
}

/// Phases of the translation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePhase {
    Harvest,
    Route,
    Translate,
    Scatter,
}

impl PipelinePhase {
    /// Share of the overall run completed when this phase starts
    fn start_fraction(self) -> f32 {
        match self {
            PipelinePhase::Harvest => 0.0,
            PipelinePhase::Route => 0.1,
            PipelinePhase::Translate => 0.2,
            PipelinePhase::Scatter => 0.9,
        }
    }
}

/// Progress notification handed to the callback at each phase boundary.
#[derive(Debug, Clone)]
pub struct PipelineProgress {
    pub phase: PipelinePhase,

    /// Overall progress (0.0 - 1.0)
    pub overall_progress: f32,

    pub status: String,
}

impl PipelineProgress {
    fn at(phase: PipelinePhase, status: String) -> Self {
        Self {
            phase,
            overall_progress: phase.start_fraction(),
            status,
        }
    }
}

/// Callback receiving phase progress
pub type ProgressCallback = Box<dyn Fn(PipelineProgress) + Send + Sync>;

/// Segment kind in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Text,
    TableCell,
}

/// One queue entry with its resolved value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub page: u32,
    pub kind: SegmentKind,
    pub original: String,
    pub translated: String,
    pub route: Route,
}

/// Result of the complete pipeline execution.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub plan: RenderPlan,

    pub stats: DocumentStats,

    /// Every queue entry in harvest order
    pub segments: Vec<Segment>,

    /// Translated text, one line per segment, pages separated by a blank line
    pub full_text: String,

    pub duration: Duration,
}

impl PipelineResult {
    /// Get a summary of the pipeline result.
    pub fn summary(&self) -> String {
        format!(
            "{} | {} render ops | Duration: {:.2}s",
            self.stats.summary(),
            self.plan.ops.len(),
            self.duration.as_secs_f32()
        )
    }
}

/// The main translation pipeline orchestrator.
pub struct TranslationPipeline {
    harvester: Harvester,
    router: Router,
    translator: BatchTranslator,
    glossary: FinancialGlossary,
    scatter: Scatter,
    service: Arc<ModelService>,
}

impl TranslationPipeline {
    /// Create a pipeline around an already constructed model service.
    pub fn new(service: Arc<ModelService>, config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::with_ocr(service, config, Box::new(PrecomputedOcr))
    }

    /// Same as `new` with a custom OCR engine.
    pub fn with_ocr(
        service: Arc<ModelService>,
        config: PipelineConfig,
        ocr: Box<dyn OcrEngine>,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            harvester: Harvester::new(config.harvest, ocr),
            router: Router::new(&config.bypass_pattern)?,
            translator: BatchTranslator::new(Arc::clone(&service), config.batch),
            glossary: FinancialGlossary::new(&config.extra_glossary_terms),
            scatter: Scatter::new(config.layout),
            service,
        })
    }

    pub fn service(&self) -> &Arc<ModelService> {
        &self.service
    }

    /// Translate a document through all four phases.
    pub async fn run(&self, document: &LayoutDocument) -> Result<PipelineResult, PipelineError> {
        self.run_with_progress(document, None).await
    }

    /// Translate a document, reporting each phase to `progress`.
    pub async fn run_with_progress(
        &self,
        document: &LayoutDocument,
        progress: Option<&ProgressCallback>,
    ) -> Result<PipelineResult, PipelineError> {
        let start_time = Instant::now();
        let notify = |phase: PipelinePhase, status: String| {
            if let Some(callback) = progress {
                callback(PipelineProgress::at(phase, status));
            }
        };

        // Phase 1: Harvest
        notify(PipelinePhase::Harvest, format!("Harvesting {} pages", document.pages.len()));
        let harvest = self.harvester.harvest(document)?;
        let queue = TranslationQueue::from_spans(harvest.spans);

        // Phase 2: Route
        let distinct = queue.distinct_texts();
        notify(
            PipelinePhase::Route,
            format!("Routing {} distinct strings", distinct.len()),
        );
        let mut map = UniqueStringMap::new();
        let mut needs_translation = Vec::new();
        for text in &distinct {
            match self.router.classify(text) {
                Classification::Bypass(value) => map.insert(text, value, Route::Bypassed),
                Classification::NeedsTranslation(value) => needs_translation.push(value),
            }
        }
        info!(
            "Routing: {} distinct strings, {} bypassed, {} for the model",
            distinct.len(),
            map.len(),
            needs_translation.len()
        );

        // Phase 3: Translate
        notify(
            PipelinePhase::Translate,
            format!("Translating {} strings", needs_translation.len()),
        );
        let outcome = self.translator.translate_all(&needs_translation).await;
        for text in &needs_translation {
            match outcome.translations.get(text) {
                Some(translation) => map.insert(text, translation.text.clone(), translation.route),
                None => {
                    warn!("No translation produced for a string, passing original through");
                    map.insert(text, text.clone(), Route::Fallback);
                }
            }
        }
        map.map_translations(|text| self.glossary.apply(text));

        // Phase 4: Scatter
        notify(PipelinePhase::Scatter, format!("Placing {} spans", queue.len()));
        let plan = self.scatter.plan(&harvest.pages, &queue, &map);

        let segments = build_segments(&queue, &map);
        let full_text = build_full_text(&harvest.pages, &segments);
        let duration = start_time.elapsed();

        let stats = DocumentStats {
            pages: document.pages.len(),
            text_blocks_translated: count_text_blocks(&queue, &map),
            tables_translated: count_tables(&queue, &map),
            bypassed: count_entries(&queue, &map, Route::Bypassed),
            fallbacks: count_entries(&queue, &map, Route::Fallback),
            unique_strings: map.len(),
            model_calls: outcome.model_calls,
            cache_hits: outcome.cache_hits,
            ocr_pages: harvest.ocr_pages,
            overflow_spans: plan.overflow_count(),
            duration_ms: duration.as_millis() as u64,
        };
        info!("Pipeline finished: {}", stats.summary());

        Ok(PipelineResult {
            plan,
            stats,
            segments,
            full_text,
            duration,
        })
    }
}

fn route_of(map: &UniqueStringMap, text: &str) -> Route {
    map.get(text).map(|r| r.route).unwrap_or(Route::Fallback)
}

fn count_entries(queue: &TranslationQueue, map: &UniqueStringMap, route: Route) -> usize {
    queue
        .entries()
        .iter()
        .filter(|e| route_of(map, &e.original_text) == route)
        .count()
}

fn count_text_blocks(queue: &TranslationQueue, map: &UniqueStringMap) -> usize {
    queue
        .entries()
        .iter()
        .filter(|e| !e.location.is_table_cell && route_of(map, &e.original_text) == Route::Model)
        .count()
}

fn count_tables(queue: &TranslationQueue, map: &UniqueStringMap) -> usize {
    queue
        .entries()
        .iter()
        .filter(|e| route_of(map, &e.original_text) == Route::Model)
        .filter_map(|e| e.location.table.map(|t| (e.location.page, t.index)))
        .collect::<HashSet<_>>()
        .len()
}

fn build_segments(queue: &TranslationQueue, map: &UniqueStringMap) -> Vec<Segment> {
    queue
        .entries()
        .iter()
        .map(|entry| {
            let (translated, route) = match map.get(&entry.original_text) {
                Some(resolved) => (resolved.translated.clone(), resolved.route),
                None => (entry.original_text.clone(), Route::Fallback),
            };
            Segment {
                page: entry.location.page,
                kind: if entry.location.is_table_cell {
                    SegmentKind::TableCell
                } else {
                    SegmentKind::Text
                },
                original: entry.original_text.clone(),
                translated,
                route,
            }
        })
        .collect()
}

/// One block per page, in page order; a page without segments contributes an empty block
fn build_full_text(pages: &[PageGeometry], segments: &[Segment]) -> String {
    pages
        .iter()
        .map(|page| {
            segments
                .iter()
                .filter(|s| s.page == page.number)
                .map(|s| s.translated.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
