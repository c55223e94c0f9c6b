/*!
 * Tests for configuration loading and validation
 */

use anyhow::Result;
use finlate::app_config::{Config, LogLevel};
use finlate::translation::pipeline::PipelineConfig;

use crate::common::{create_temp_dir, create_test_file};

/// Test that a missing config file is created with defaults
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.source_language, "ar");
    assert_eq!(config.target_language, "en");
    assert_eq!(config.model.model, "Helsinki-NLP/opus-mt-ar-en");
    assert_eq!(config.translation.strategies.len(), 2);
    assert_eq!(config.layout.min_font_size, 4.0);
    assert_eq!(config.layout.max_font_size, 12.0);
    assert_eq!(config.log_level, LogLevel::Info);
    Ok(())
}

/// Test that an existing file is read, with missing sections defaulted
#[test]
fn test_loadOrCreate_withPartialFile_shouldFillDefaults() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = create_test_file(
        dir.path(),
        "conf.json",
        r#"{
            "model": { "endpoint": "http://gpu-box:9000" },
            "translation": {
                "batch_size": 8,
                "strategies": [ { "num_beams": 2 } ]
            },
            "glossary": { "extra_terms": { "Murabaha": "Cost-plus financing" } },
            "log_level": "debug"
        }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.model.endpoint, "http://gpu-box:9000");
    assert_eq!(config.model.max_retries, 3);
    assert_eq!(config.translation.batch_size, 8);
    assert_eq!(config.translation.strategies[0].num_beams, 2);
    assert_eq!(config.translation.strategies[0].no_repeat_ngram_size, 3);
    assert_eq!(config.translation.cache_capacity, 10_000);
    assert_eq!(config.glossary.extra_terms.len(), 1);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.validate().is_ok());
    Ok(())
}

#[test]
fn test_loadOrCreate_withBrokenJson_shouldFail() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = create_test_file(dir.path(), "conf.json", "{ not json")?;
    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_save_thenLoad_shouldKeepValues() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("saved.json");

    let mut config = Config::default();
    config.layout.cover_color = "#F5F5DC".to_string();
    config.routing.fold_letter_variants = true;
    config.save(&path)?;

    let loaded = Config::load_or_create(&path)?;
    assert_eq!(loaded.layout.cover_color, "#F5F5DC");
    assert!(loaded.routing.fold_letter_variants);
    Ok(())
}

#[test]
fn test_validate_withBadValues_shouldFail() {
    let mut bad_color = Config::default();
    bad_color.layout.cover_color = "white".to_string();
    assert!(bad_color.validate().is_err());

    let mut bad_factor = Config::default();
    bad_factor.layout.table_size_factor = 1.5;
    assert!(bad_factor.validate().is_err());

    let mut bad_target = Config::default();
    bad_target.target_language = "xx".to_string();
    assert!(bad_target.validate().is_err());

    let mut bad_confidence = Config::default();
    bad_confidence.harvest.min_ocr_confidence = 150.0;
    assert!(bad_confidence.validate().is_err());

    let mut too_many_retries = Config::default();
    too_many_retries.model.max_retries = 70;
    assert!(too_many_retries.validate().is_err());

    let mut no_cache_room = Config::default();
    no_cache_room.translation.cache_capacity = 0;
    assert!(no_cache_room.validate().is_err());
}

/// The pipeline settings follow the configuration
#[test]
fn test_pipelineConfig_fromConfig_shouldCarrySettings() -> Result<()> {
    let mut config = Config::default();
    config.translation.batch_size = 16;
    config.layout.prose_size_factor = 0.9;
    config.harvest.min_ocr_confidence = 50.0;

    let pipeline = PipelineConfig::from_config(&config)?;

    assert_eq!(pipeline.batch.batch_size, 16);
    assert_eq!(pipeline.layout.prose_size_factor, 0.9);
    assert_eq!(pipeline.harvest.min_ocr_confidence, 50.0);
    assert_eq!(pipeline.bypass_pattern, config.routing.bypass_pattern);
    Ok(())
}
