/*!
 * Model service.
 *
 * The service owns the translation model handle, the inference semaphore and
 * the unit cache. It is built once per process and shared (`Arc`) by every
 * document pipeline; nothing in it is document-scoped.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio::sync::Semaphore;

use super::cache::{DEFAULT_CACHE_CAPACITY, TranslationCache};
use crate::app_config::Config;
use crate::errors::ModelError;
use crate::providers::{DecodingParams, HttpModel, HttpModelConfig, TranslationModel};

/// Construction options for a model service
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub source_language: String,
    pub target_language: String,
    /// Inference calls allowed in flight at once
    pub max_concurrent_inferences: usize,
    pub cache_enabled: bool,
    /// Most units the cache keeps
    pub cache_capacity: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            source_language: "ar".to_string(),
            target_language: "en".to_string(),
            max_concurrent_inferences: 1,
            cache_enabled: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Shared handle to a loaded translation model
pub struct ModelService {
    model: Arc<dyn TranslationModel>,
    semaphore: Arc<Semaphore>,
    cache: TranslationCache,
    options: ServiceOptions,
    total_calls: AtomicUsize,
}

impl std::fmt::Debug for ModelService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelService")
            .field("model", &self.model.name())
            .field("options", &self.options)
            .field("total_calls", &self.total_calls.load(Ordering::SeqCst))
            .finish()
    }
}

impl ModelService {
    /// Wrap an already constructed model
    pub fn new(model: Arc<dyn TranslationModel>, options: ServiceOptions) -> Self {
        let permits = options.max_concurrent_inferences.max(1);
        Self {
            model,
            semaphore: Arc::new(Semaphore::new(permits)),
            cache: TranslationCache::new(options.cache_enabled, options.cache_capacity),
            options,
            total_calls: AtomicUsize::new(0),
        }
    }

    /// Build the HTTP-backed service described by the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config
            .validate()
            .context("Cannot build model service from invalid configuration")?;

        let model = HttpModel::new(HttpModelConfig {
            endpoint: config.model.endpoint.clone(),
            model: config.model.model.clone(),
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            timeout_secs: config.model.timeout_secs,
            max_retries: config.model.max_retries,
            retry_backoff_ms: config.model.retry_backoff_ms,
            max_new_tokens: config.model.max_new_tokens,
        });
        info!(
            "Using model '{}' at {} ({} -> {})",
            config.model.model, config.model.endpoint, config.source_language, config.target_language
        );

        Ok(Self::new(
            Arc::new(model),
            ServiceOptions {
                source_language: config.source_language.clone(),
                target_language: config.target_language.clone(),
                max_concurrent_inferences: config.translation.max_concurrent_inferences,
                cache_enabled: config.translation.cache_enabled,
                cache_capacity: config.translation.cache_capacity,
            },
        ))
    }

    /// Run one inference call, waiting for a free permit first
    pub async fn infer(
        &self,
        texts: &[String],
        params: &DecodingParams,
    ) -> Result<Vec<String>, ModelError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| ModelError::Unavailable(e.to_string()))?;

        self.total_calls.fetch_add(1, Ordering::SeqCst);
        let start = Instant::now();
        let outputs = self.model.translate_batch(texts, params).await?;
        debug!(
            "Inference of {} units (beams={}) took {:?}",
            texts.len(),
            params.num_beams,
            start.elapsed()
        );

        if outputs.len() != texts.len() {
            return Err(ModelError::BatchSizeMismatch {
                expected: texts.len(),
                actual: outputs.len(),
            });
        }
        Ok(outputs)
    }

    /// Probe the backend
    pub async fn health_check(&self) -> Result<(), ModelError> {
        self.model.health_check().await
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn source_language(&self) -> &str {
        &self.options.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.options.target_language
    }

    pub fn max_concurrent_inferences(&self) -> usize {
        self.options.max_concurrent_inferences.max(1)
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Inference calls made over the service lifetime
    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }
}
