/*!
 * Batch translation of distinct strings.
 *
 * Strings are cut into sentence units and cleaned; distinct units are looked
 * up in the service cache, then sent to the model in fixed-size batches. Each
 * decoding strategy is one pass over the units still lacking a valid output.
 * A string whose units are not all resolved after the last strategy falls
 * back to its original text.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::cache::truncate_text;
use super::core::ModelService;
use super::normalizer::Normalizer;
use super::pipeline::queue::Route;
use super::quality::TranslationValidator;
use super::segmenter::{SegmentedText, Segmenter};
use crate::providers::DecodingParams;

/// Options for the batch translator
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Units per model call
    pub batch_size: usize,
    /// Upper bound on unit length in characters
    pub max_unit_chars: usize,
    /// Decoding strategies, tried in order
    pub strategies: Vec<DecodingParams>,
    /// Token run length rejected as a loop
    pub max_repeated_token_run: usize,
    /// Fold letter variants before inference
    pub fold_letter_variants: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 32,
            max_unit_chars: 400,
            strategies: default_strategies(),
            max_repeated_token_run: 4,
            fold_letter_variants: false,
        }
    }
}

/// First pass at 4 beams, one retry at 8 beams with a shorter-output bias
pub fn default_strategies() -> Vec<DecodingParams> {
    vec![
        DecodingParams::new(4, 3),
        DecodingParams::new(8, 3).with_length_penalty(0.8),
    ]
}

/// Translation of one distinct string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringTranslation {
    pub text: String,
    /// `Route::Model` or `Route::Fallback`; `Route::Bypassed` when cleaning leaves nothing to translate
    pub route: Route,
}

/// Result of translating a set of distinct strings
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub translations: HashMap<String, StringTranslation>,
    /// Model calls made for this set
    pub model_calls: usize,
    /// Units served from the cache
    pub cache_hits: usize,
    /// Distinct units after cleaning
    pub unique_units: usize,
}

impl BatchOutcome {
    pub fn fallbacks(&self) -> usize {
        self.translations
            .values()
            .filter(|t| t.route == Route::Fallback)
            .count()
    }
}

/// A string prepared for inference
struct PreparedString {
    segmented: SegmentedText,
    /// Cleaned form of each unit, in `segmented.units()` order
    cleaned: Vec<String>,
}

/// Batch translator bound to a shared model service
pub struct BatchTranslator {
    service: Arc<ModelService>,
    normalizer: Normalizer,
    segmenter: Segmenter,
    validator: TranslationValidator,
    options: BatchOptions,
}

impl BatchTranslator {
    pub fn new(service: Arc<ModelService>, options: BatchOptions) -> Self {
        Self {
            normalizer: Normalizer::new(options.fold_letter_variants),
            segmenter: Segmenter::new(options.max_unit_chars),
            validator: TranslationValidator::new(options.max_repeated_token_run),
            service,
            options,
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Translate distinct strings into a map keyed by the input string
    pub async fn translate_all(&self, texts: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        if texts.is_empty() {
            return outcome;
        }

        let prepared: Vec<PreparedString> = texts.iter().map(|t| self.prepare(t)).collect();

        let mut units: Vec<String> = Vec::new();
        let mut seen = HashSet::new();
        for string in &prepared {
            for unit in &string.cleaned {
                if !unit.is_empty() && seen.insert(unit.clone()) {
                    units.push(unit.clone());
                }
            }
        }
        outcome.unique_units = units.len();

        let source = self.service.source_language();
        let target = self.service.target_language();
        let mut resolved: HashMap<String, String> = HashMap::new();
        let mut pending: Vec<String> = Vec::new();
        for unit in units {
            match self.service.cache().get(&unit, source, target) {
                Some(hit) => {
                    outcome.cache_hits += 1;
                    resolved.insert(unit, hit);
                }
                None => pending.push(unit),
            }
        }

        info!(
            "Translating {} strings: {} unique units, {} cached",
            texts.len(),
            outcome.unique_units,
            outcome.cache_hits
        );

        for (attempt, params) in self.options.strategies.iter().enumerate() {
            if pending.is_empty() {
                break;
            }
            if attempt > 0 {
                info!(
                    "Retrying {} units with num_beams={}, length_penalty={}",
                    pending.len(),
                    params.num_beams,
                    params.length_penalty
                );
            }

            let (accepted, calls) = self.run_strategy(&pending, params).await;
            outcome.model_calls += calls;

            for (unit, translation) in accepted {
                self.service.cache().store(&unit, source, target, &translation);
                resolved.insert(unit, translation);
            }
            pending.retain(|unit| !resolved.contains_key(unit));
        }

        for (original, string) in texts.iter().zip(prepared) {
            if string.cleaned.iter().all(String::is_empty) {
                debug!(
                    "Nothing left to translate in '{}' after cleaning, passing through",
                    truncate_text(original, 40)
                );
                outcome.translations.insert(
                    original.clone(),
                    StringTranslation {
                        text: original.clone(),
                        route: Route::Bypassed,
                    },
                );
                continue;
            }

            let complete = string
                .cleaned
                .iter()
                .all(|unit| unit.is_empty() || resolved.contains_key(unit));

            let translation = if complete {
                let outputs = string
                    .cleaned
                    .iter()
                    .map(|unit| resolved.get(unit).map(String::as_str).unwrap_or(""));
                StringTranslation {
                    text: string.segmented.rejoin(outputs),
                    route: Route::Model,
                }
            } else {
                warn!(
                    "No valid translation for '{}' after {} strategies, keeping original",
                    truncate_text(original, 40),
                    self.options.strategies.len()
                );
                StringTranslation {
                    text: original.clone(),
                    route: Route::Fallback,
                }
            };
            outcome.translations.insert(original.clone(), translation);
        }

        outcome
    }

    fn prepare(&self, text: &str) -> PreparedString {
        let segmented = self.segmenter.segment(text);
        let cleaned = segmented
            .units()
            .map(|unit| self.normalizer.clean(unit))
            .collect();
        PreparedString { segmented, cleaned }
    }

    /// One pass of a decoding strategy over `pending`.
    ///
    /// Returns the validated translations and the number of model calls made.
    async fn run_strategy(
        &self,
        pending: &[String],
        params: &DecodingParams,
    ) -> (Vec<(String, String)>, usize) {
        let batch_size = self.options.batch_size.max(1);
        let batches: Vec<&[String]> = pending.chunks(batch_size).collect();
        let total_batches = batches.len();

        let results = stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| async move {
                let result = self.service.infer(batch, params).await;
                (index, batch, result)
            })
            .buffer_unordered(self.service.max_concurrent_inferences())
            .collect::<Vec<_>>()
            .await;

        let mut accepted = Vec::new();
        for (index, batch, result) in results {
            match result {
                Ok(outputs) => {
                    for (unit, output) in batch.iter().zip(outputs) {
                        let output = output.trim().to_string();
                        match self.validator.validate(unit, &output) {
                            Ok(()) => accepted.push((unit.clone(), output)),
                            Err(rejection) => debug!(
                                "Rejected translation of '{}': {}",
                                truncate_text(unit, 30),
                                rejection
                            ),
                        }
                    }
                    debug!("Batch {}/{} done", index + 1, total_batches);
                }
                Err(e) => {
                    warn!(
                        "Batch {}/{} failed (num_beams={}): {}",
                        index + 1,
                        total_batches,
                        params.num_beams,
                        e
                    );
                }
            }
        }

        (accepted, total_batches)
    }
}
