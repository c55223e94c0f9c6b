use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ModelError;
use crate::providers::{DecodingParams, TranslationModel};

/// Settings for an HTTP model backend
#[derive(Debug, Clone)]
pub struct HttpModelConfig {
    /// Base URL of the inference server
    pub endpoint: String,
    /// Model identifier forwarded to the server
    pub model: String,
    /// Source language code
    pub source_language: String,
    /// Target language code
    pub target_language: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    pub retry_backoff_ms: u64,
    /// Generation length cap per unit
    pub max_new_tokens: u32,
}

/// Upper bound for a single retry wait
const MAX_BACKOFF_MS: u64 = 30_000;

/// Exponential backoff before retry number `attempt` (1-based), capped at `MAX_BACKOFF_MS`
fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let ms = 1u64
        .checked_shl(attempt.saturating_sub(1))
        .and_then(|factor| base_ms.checked_mul(factor))
        .unwrap_or(MAX_BACKOFF_MS)
        .min(MAX_BACKOFF_MS);
    Duration::from_millis(ms)
}

/// Client for a sequence-to-sequence model behind a batch HTTP endpoint
#[derive(Debug)]
pub struct HttpModel {
    /// Base URL without trailing slash
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    settings: HttpModelConfig,
}

/// Batch request body
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchTranslationRequest {
    pub model: String,
    pub source_language: String,
    pub target_language: String,
    pub texts: Vec<String>,
    pub num_beams: u32,
    pub no_repeat_ngram_size: u32,
    pub length_penalty: f32,
    pub max_new_tokens: u32,
}

/// Batch response body
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchTranslationResponse {
    pub translations: Vec<String>,
}

impl HttpModel {
    /// Create a new client
    ///
    /// Uses a pooled HTTP/1.1 client; the server is expected to keep the model
    /// resident between calls.
    pub fn new(settings: HttpModelConfig) -> Self {
        let base_url = settings.endpoint.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            base_url,
            client,
            settings,
        }
    }

    /// Base URL requests go to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request(&self, texts: &[String], params: &DecodingParams) -> BatchTranslationRequest {
        BatchTranslationRequest {
            model: self.settings.model.clone(),
            source_language: self.settings.source_language.clone(),
            target_language: self.settings.target_language.clone(),
            texts: texts.to_vec(),
            num_beams: params.num_beams,
            no_repeat_ngram_size: params.no_repeat_ngram_size,
            length_penalty: params.length_penalty,
            max_new_tokens: self.settings.max_new_tokens,
        }
    }
}

#[async_trait]
impl TranslationModel for HttpModel {
    async fn translate_batch(
        &self,
        texts: &[String],
        params: &DecodingParams,
    ) -> Result<Vec<String>, ModelError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/translate", self.base_url);
        let request = self.build_request(texts, params);
        let max_retries = self.settings.max_retries;

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= max_retries {
            match self.client.post(&url).json(&request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response
                            .text()
                            .await
                            .map_err(|e| ModelError::ParseError(e.to_string()))?;
                        let parsed: BatchTranslationResponse = serde_json::from_str(&body)
                            .map_err(|e| {
                                error!(
                                    "Failed to parse model response: {}. Raw response (first 500 chars): {}",
                                    e,
                                    body.chars().take(500).collect::<String>()
                                );
                                ModelError::ParseError(e.to_string())
                            })?;

                        if parsed.translations.len() != texts.len() {
                            return Err(ModelError::BatchSizeMismatch {
                                expected: texts.len(),
                                actual: parsed.translations.len(),
                            });
                        }
                        debug!("Model returned {} translations", parsed.translations.len());
                        return Ok(parsed.translations);
                    } else if status.is_server_error() {
                        // Server error - can retry
                        let message = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        error!(
                            "Model server error ({}): {} - attempt {}/{}",
                            status,
                            message,
                            attempt + 1,
                            max_retries + 1
                        );
                        last_error = Some(ModelError::ApiError {
                            status_code: status.as_u16(),
                            message,
                        });
                    } else {
                        // Client error - don't retry
                        let message = response
                            .text()
                            .await
                            .unwrap_or_else(|_| "Failed to get error response text".to_string());
                        error!("Model server error ({}): {}", status, message);
                        return Err(ModelError::ApiError {
                            status_code: status.as_u16(),
                            message,
                        });
                    }
                }
                Err(e) => {
                    // Network error - can retry
                    error!(
                        "Model network error: {} - attempt {}/{}",
                        e,
                        attempt + 1,
                        max_retries + 1
                    );
                    last_error = Some(ModelError::ConnectionError(e.to_string()));
                }
            }

            attempt += 1;

            if attempt <= max_retries {
                tokio::time::sleep(backoff_delay(self.settings.retry_backoff_ms, attempt)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ModelError::RequestFailed(format!(
                "model request failed after {} attempts",
                max_retries + 1
            ))
        }))
    }

    async fn health_check(&self) -> Result<(), ModelError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ModelError::Unavailable(format!("{}: {}", self.base_url, e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ModelError::ApiError {
                status_code: response.status().as_u16(),
                message: format!("health check failed for model {}", self.settings.model),
            })
        }
    }

    fn name(&self) -> &str {
        &self.settings.model
    }
}
