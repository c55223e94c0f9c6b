/*!
 * Tests for error types and conversions
 */

use finlate::errors::{AppError, ExtractionError, ModelError, PipelineError};

#[test]
fn test_modelError_apiError_shouldDisplayStatusAndMessage() {
    let error = ModelError::ApiError {
        status_code: 503,
        message: "model loading".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("503"));
    assert!(display.contains("model loading"));
}

#[test]
fn test_modelError_batchSizeMismatch_shouldNameBothCounts() {
    let error = ModelError::BatchSizeMismatch { expected: 4, actual: 3 };
    assert_eq!(format!("{}", error), "Model returned 3 translations for 4 inputs");
}

#[test]
fn test_extractionError_ocr_shouldNamePage() {
    let error = ExtractionError::Ocr {
        page: 2,
        message: "engine crashed".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("page 2"));
    assert!(display.contains("engine crashed"));
}

#[test]
fn test_pipelineError_fromRegexError_shouldBeInvalidPattern() {
    let regex_error = regex::Regex::new("([0-9").unwrap_err();
    let error: PipelineError = regex_error.into();
    assert!(matches!(error, PipelineError::InvalidPattern(_)));
    assert!(format!("{}", error).starts_with("Invalid bypass pattern"));
}

#[test]
fn test_appError_fromModelError_shouldWrap() {
    let error: AppError = ModelError::Unavailable("no route".to_string()).into();
    assert!(matches!(error, AppError::Model(ModelError::Unavailable(_))));
    assert!(format!("{}", error).contains("no route"));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
    let error: AppError = io.into();
    assert!(matches!(error, AppError::File(_)));
    assert!(format!("{}", error).contains("missing.json"));
}

#[test]
fn test_appError_fromSerdeError_shouldMentionJson() {
    let parse = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
    let error: AppError = parse.into();
    assert!(format!("{}", error).contains("invalid JSON"));
}

#[test]
fn test_appError_fromAnyhow_shouldBeUnknown() {
    let error: AppError = anyhow::anyhow!("something odd").into();
    assert!(matches!(error, AppError::Unknown(ref message) if message == "something odd"));
}
