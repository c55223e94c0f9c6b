/*!
 * Translation model backends.
 *
 * This module contains the interface the pipeline uses to reach a
 * sequence-to-sequence translation model, plus its implementations:
 * - `HttpModel`: a model served over HTTP (batch endpoint)
 * - `MockModel`: a deterministic in-process model for tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ModelError;

/// Decoding parameters sent with every batch
///
/// The batch translator walks a list of these, one per attempt, until the
/// output passes validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodingParams {
    /// Beam width
    #[serde(default = "default_num_beams")]
    pub num_beams: u32,

    /// Forbid repeating n-grams of this size (0 disables)
    #[serde(default = "default_no_repeat_ngram_size")]
    pub no_repeat_ngram_size: u32,

    /// Length penalty applied to beam scores
    #[serde(default = "default_length_penalty")]
    pub length_penalty: f32,
}

fn default_num_beams() -> u32 {
    4
}

fn default_no_repeat_ngram_size() -> u32 {
    3
}

fn default_length_penalty() -> f32 {
    1.0
}

impl Default for DecodingParams {
    fn default() -> Self {
        Self {
            num_beams: default_num_beams(),
            no_repeat_ngram_size: default_no_repeat_ngram_size(),
            length_penalty: default_length_penalty(),
        }
    }
}

impl DecodingParams {
    /// Create parameters with the given beam width and n-gram block size
    pub fn new(num_beams: u32, no_repeat_ngram_size: u32) -> Self {
        Self {
            num_beams,
            no_repeat_ngram_size,
            length_penalty: default_length_penalty(),
        }
    }

    /// Set the length penalty
    pub fn with_length_penalty(mut self, length_penalty: f32) -> Self {
        self.length_penalty = length_penalty;
        self
    }
}

/// Common trait for all model backends
///
/// Implementations must return exactly one output per input, in input order.
#[async_trait]
pub trait TranslationModel: Send + Sync + Debug {
    /// Translate a batch of source texts
    ///
    /// # Arguments
    /// * `texts` - Source units, already normalised
    /// * `params` - Decoding parameters for this attempt
    ///
    /// # Returns
    /// * `Result<Vec<String>, ModelError>` - One translation per input, or an error
    async fn translate_batch(
        &self,
        texts: &[String],
        params: &DecodingParams,
    ) -> Result<Vec<String>, ModelError>;

    /// Check that the backend is reachable and the model is loaded
    async fn health_check(&self) -> Result<(), ModelError>;

    /// Human readable backend name for logs
    fn name(&self) -> &str;
}

pub mod http;
pub mod mock;

pub use http::{HttpModel, HttpModelConfig};
pub use mock::{MockBehavior, MockModel};
