use anyhow::{Context, Result, anyhow};
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::providers::DecodingParams;
use crate::render::CoverColor;
use crate::translation::batch::default_strategies;
use crate::translation::router::DEFAULT_BYPASS_PATTERN;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO), must use the Arabic script
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation model backend
    #[serde(default)]
    pub model: ModelConfig,

    /// Batching and validation
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Bypass routing and text cleaning
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Page harvesting
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Font fitting and cover painting
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Terminology corrections
    #[serde(default)]
    pub glossary: GlossaryConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation model service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelConfig {
    /// Base URL of the inference server
    #[serde(default = "default_model_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model_name")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff base for retries (in milliseconds), doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Generation cap per unit
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_model_endpoint(),
            model: default_model_name(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_new_tokens: default_max_new_tokens(),
        }
    }
}

/// Batch translation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Units per model call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Longest sentence unit in characters
    #[serde(default = "default_max_unit_chars")]
    pub max_unit_chars: usize,

    /// Inference calls allowed to run at once
    #[serde(default = "default_max_concurrent_inferences")]
    pub max_concurrent_inferences: usize,

    /// Decoding strategies, tried in order until the output validates
    #[serde(default = "default_strategies")]
    pub strategies: Vec<DecodingParams>,

    /// Consecutive repeats of one word rejected as a generation loop
    #[serde(default = "default_max_repeated_token_run")]
    pub max_repeated_token_run: usize,

    /// Keep unit translations across documents
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Most unit translations kept in memory before the least recently used is dropped
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_unit_chars: default_max_unit_chars(),
            max_concurrent_inferences: default_max_concurrent_inferences(),
            strategies: default_strategies(),
            max_repeated_token_run: default_max_repeated_token_run(),
            cache_enabled: true,
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// Router configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RoutingConfig {
    /// Strings fully matching this pattern skip the model
    #[serde(default = "default_bypass_pattern")]
    pub bypass_pattern: String,

    /// Fold alef/yeh/teh marbuta variants before inference
    #[serde(default)]
    pub fold_letter_variants: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            bypass_pattern: default_bypass_pattern(),
            fold_letter_variants: false,
        }
    }
}

/// Harvester configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HarvestConfig {
    /// OCR words below this confidence (0-100) are dropped
    #[serde(default = "default_min_ocr_confidence")]
    pub min_ocr_confidence: f32,

    /// Vertical distance within which OCR words share a line
    #[serde(default = "default_ocr_line_tolerance")]
    pub ocr_line_tolerance: f64,

    /// Mean words per cell above which a table candidate is prose
    #[serde(default = "default_max_words_per_cell")]
    pub max_words_per_cell: f64,

    /// Digit share below which a table candidate is prose (0 disables)
    #[serde(default)]
    pub min_numeric_ratio: f64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            min_ocr_confidence: default_min_ocr_confidence(),
            ocr_line_tolerance: default_ocr_line_tolerance(),
            max_words_per_cell: default_max_words_per_cell(),
            min_numeric_ratio: 0.0,
        }
    }
}

/// Layout configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LayoutConfig {
    #[serde(default = "default_min_font_size")]
    pub min_font_size: f64,

    #[serde(default = "default_max_font_size")]
    pub max_font_size: f64,

    #[serde(default = "default_font_step")]
    pub font_step: f64,

    /// Line height as a multiple of the font size
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f64,

    #[serde(default = "default_prose_size_factor")]
    pub prose_size_factor: f64,

    #[serde(default = "default_table_size_factor")]
    pub table_size_factor: f64,

    /// `#RRGGBB`
    #[serde(default = "default_cover_color")]
    pub cover_color: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_font_size: default_min_font_size(),
            max_font_size: default_max_font_size(),
            font_step: default_font_step(),
            line_spacing: default_line_spacing(),
            prose_size_factor: default_prose_size_factor(),
            table_size_factor: default_table_size_factor(),
            cover_color: default_cover_color(),
        }
    }
}

/// Glossary configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GlossaryConfig {
    /// Model output → preferred term, on top of the built-in list
    #[serde(default)]
    pub extra_terms: HashMap<String, String>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_source_language() -> String {
    "ar".to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_model_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_model_name() -> String {
    "Helsinki-NLP/opus-mt-ar-en".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// Upper bound accepted for `model.max_retries`
pub const MAX_MODEL_RETRIES: u32 = 16;

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_max_new_tokens() -> u32 {
    512
}

fn default_batch_size() -> usize {
    32
}

fn default_max_unit_chars() -> usize {
    400
}

fn default_max_concurrent_inferences() -> usize {
    1
}

fn default_max_repeated_token_run() -> usize {
    4
}

fn default_cache_capacity() -> usize {
    crate::translation::cache::DEFAULT_CACHE_CAPACITY
}

fn default_true() -> bool {
    true
}

fn default_bypass_pattern() -> String {
    DEFAULT_BYPASS_PATTERN.to_string()
}

fn default_min_ocr_confidence() -> f32 {
    30.0
}

fn default_ocr_line_tolerance() -> f64 {
    10.0
}

fn default_max_words_per_cell() -> f64 {
    6.0
}

fn default_min_font_size() -> f64 {
    4.0
}

fn default_max_font_size() -> f64 {
    12.0
}

fn default_font_step() -> f64 {
    0.5
}

fn default_line_spacing() -> f64 {
    1.2
}

fn default_prose_size_factor() -> f64 {
    0.8
}

fn default_table_size_factor() -> f64 {
    0.7
}

fn default_cover_color() -> String {
    "#FFFFFF".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::ensure_supported_pair(&self.source_language, &self.target_language)?;

        url::Url::parse(&self.model.endpoint)
            .with_context(|| format!("Invalid model endpoint: {}", self.model.endpoint))?;
        if self.model.model.trim().is_empty() {
            return Err(anyhow!("Model name must not be empty"));
        }
        if self.model.max_retries > MAX_MODEL_RETRIES {
            return Err(anyhow!(
                "model.max_retries must be at most {}, got {}",
                MAX_MODEL_RETRIES,
                self.model.max_retries
            ));
        }

        if self.translation.batch_size == 0 {
            return Err(anyhow!("translation.batch_size must be greater than 0"));
        }
        if self.translation.max_unit_chars == 0 {
            return Err(anyhow!("translation.max_unit_chars must be greater than 0"));
        }
        if self.translation.max_concurrent_inferences == 0 {
            return Err(anyhow!("translation.max_concurrent_inferences must be greater than 0"));
        }
        if self.translation.strategies.is_empty() {
            return Err(anyhow!("translation.strategies needs at least one decoding strategy"));
        }
        if self.translation.strategies.iter().any(|s| s.num_beams == 0) {
            return Err(anyhow!("Decoding strategies need at least one beam"));
        }
        if self.translation.cache_capacity == 0 {
            return Err(anyhow!("translation.cache_capacity must be greater than 0"));
        }
        if self.translation.max_repeated_token_run < 2 {
            return Err(anyhow!("translation.max_repeated_token_run must be at least 2"));
        }

        Regex::new(&self.routing.bypass_pattern)
            .with_context(|| format!("Invalid bypass pattern: {}", self.routing.bypass_pattern))?;

        let layout = &self.layout;
        if !(layout.min_font_size > 0.0 && layout.min_font_size <= layout.max_font_size) {
            return Err(anyhow!(
                "Font sizes must satisfy 0 < min_font_size <= max_font_size (got {} and {})",
                layout.min_font_size,
                layout.max_font_size
            ));
        }
        if layout.font_step <= 0.0 {
            return Err(anyhow!("layout.font_step must be positive"));
        }
        if layout.line_spacing < 1.0 {
            return Err(anyhow!("layout.line_spacing must be at least 1.0"));
        }
        for (name, factor) in [
            ("prose_size_factor", layout.prose_size_factor),
            ("table_size_factor", layout.table_size_factor),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(anyhow!("layout.{} must be in (0, 1], got {}", name, factor));
            }
        }
        if CoverColor::from_hex(&layout.cover_color).is_none() {
            return Err(anyhow!("layout.cover_color must be #RRGGBB, got '{}'", layout.cover_color));
        }

        if self.harvest.max_words_per_cell <= 0.0 {
            return Err(anyhow!("harvest.max_words_per_cell must be positive"));
        }
        if !(0.0..=1.0).contains(&self.harvest.min_numeric_ratio) {
            return Err(anyhow!("harvest.min_numeric_ratio must be between 0 and 1"));
        }
        if !(0.0..=100.0).contains(&self.harvest.min_ocr_confidence) {
            return Err(anyhow!("harvest.min_ocr_confidence must be between 0 and 100"));
        }

        Ok(())
    }

    /// Load the configuration at `path`, writing a default one first when the
    /// file does not exist
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            Ok(config)
        } else {
            warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            model: ModelConfig::default(),
            translation: TranslationConfig::default(),
            routing: RoutingConfig::default(),
            harvest: HarvestConfig::default(),
            layout: LayoutConfig::default(),
            glossary: GlossaryConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
