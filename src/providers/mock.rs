/*!
 * Mock model implementations for testing.
 *
 * This module provides a mock model that simulates different behaviors:
 * - `MockModel::working()` - Always succeeds with an English rendering
 * - `MockModel::echoing()` - Returns the source text unchanged (leaks script)
 * - `MockModel::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ModelError;
use crate::providers::{DecodingParams, TranslationModel};
use crate::script_utils::is_source_script_char;

/// Behavior mode for the mock model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a clean translation
    Working,
    /// Returns the input unchanged
    Echo,
    /// Echoes the input until the beam width reaches `num_beams`, then works
    EchoBelowBeams { num_beams: u32 },
    /// Returns a looping output ("the the the the ...")
    Repeating,
    /// Fails intermittently (every Nth call)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns one output fewer than requested
    ShortBatch,
    /// Returns empty strings
    Empty,
    /// Simulates slow response
    Slow { delay_ms: u64 },
}

/// One recorded model call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub texts: Vec<String>,
    pub params: DecodingParams,
}

/// Mock model for testing translation behavior
#[derive(Debug)]
pub struct MockModel {
    behavior: MockBehavior,
    /// Call counter for intermittent failures
    call_count: Arc<AtomicUsize>,
    /// Fixed translations by source text
    dictionary: HashMap<String, String>,
    /// Every call made, in order
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockModel {
    /// Create a new mock model with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(AtomicUsize::new(0)),
            dictionary: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock model that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock model that returns its input
    pub fn echoing() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create a failing mock model that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that only produces clean output at `num_beams` or wider
    pub fn echo_below_beams(num_beams: u32) -> Self {
        Self::new(MockBehavior::EchoBelowBeams { num_beams })
    }

    /// Create an intermittently failing mock model
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Add a fixed translation
    pub fn with_translation(mut self, source: &str, target: &str) -> Self {
        self.dictionary.insert(source.to_string(), target.to_string());
        self
    }

    /// Set a custom response generator used when the dictionary has no entry
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of `translate_batch` calls so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Snapshot of every call made so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Every text the model has been asked to translate
    pub fn seen_texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .flat_map(|call| call.texts.iter().cloned())
            .collect()
    }

    fn translate_one(&self, text: &str) -> String {
        if let Some(target) = self.dictionary.get(text) {
            return target.clone();
        }
        if let Some(generator) = self.custom_response {
            return generator(text);
        }
        // Keep only the non-Arabic part so the output is always clean
        let residue: String = text
            .chars()
            .filter(|c| !is_source_script_char(*c))
            .collect();
        let residue = residue.split_whitespace().collect::<Vec<_>>().join(" ");
        if residue.is_empty() {
            format!("translated {}", text.chars().count())
        } else {
            format!("translated {} {}", text.chars().count(), residue)
        }
    }
}

impl Clone for MockModel {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            call_count: Arc::clone(&self.call_count),
            dictionary: self.dictionary.clone(),
            calls: Arc::clone(&self.calls),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl TranslationModel for MockModel {
    async fn translate_batch(
        &self,
        texts: &[String],
        params: &DecodingParams,
    ) -> Result<Vec<String>, ModelError> {
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(RecordedCall {
            texts: texts.to_vec(),
            params: params.clone(),
        });

        match self.behavior {
            MockBehavior::Working => Ok(texts.iter().map(|t| self.translate_one(t)).collect()),

            MockBehavior::Echo => Ok(texts.to_vec()),

            MockBehavior::EchoBelowBeams { num_beams } => {
                if params.num_beams < num_beams {
                    Ok(texts.to_vec())
                } else {
                    Ok(texts.iter().map(|t| self.translate_one(t)).collect())
                }
            }

            MockBehavior::Repeating => Ok(texts
                .iter()
                .map(|_| "the the the the the the".to_string())
                .collect()),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ModelError::ApiError {
                        message: format!("Simulated intermittent failure (call #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(texts.iter().map(|t| self.translate_one(t)).collect())
                }
            }

            MockBehavior::Failing => Err(ModelError::ApiError {
                message: "Simulated model failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::ShortBatch => Ok(texts
                .iter()
                .skip(1)
                .map(|t| self.translate_one(t))
                .collect()),

            MockBehavior::Empty => Ok(vec![String::new(); texts.len()]),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(texts.iter().map(|t| self.translate_one(t)).collect())
            }
        }
    }

    async fn health_check(&self) -> Result<(), ModelError> {
        match self.behavior {
            MockBehavior::Failing => Err(ModelError::Unavailable("mock model is failing".to_string())),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
