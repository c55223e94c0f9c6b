/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use finlate::file_utils::{FileManager, FileType};
use std::path::PathBuf;

use crate::common::{create_temp_dir, create_test_file, minimal_document, write_layout};

#[test]
fn test_generateOutputPath_shouldUseStemAndTargetLanguage() {
    let path = FileManager::generate_output_path("/data/in/q3-statement.json", "/data/out", "en");
    assert_eq!(path, PathBuf::from("/data/out/q3-statement.en.json"));
}

#[test]
fn test_ensureDir_shouldCreateNestedDirectories() -> Result<()> {
    let dir = create_temp_dir()?;
    let nested = dir.path().join("a/b/c");

    FileManager::ensure_dir(&nested)?;
    assert!(FileManager::dir_exists(&nested));
    // Second call is a no-op
    FileManager::ensure_dir(&nested)?;
    Ok(())
}

#[test]
fn test_readLayout_shouldRoundTripWrittenDocument() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = write_layout(dir.path(), "minimal.json", &minimal_document())?;

    let document = FileManager::read_layout(&path)?;

    assert_eq!(document.pages.len(), 1);
    assert_eq!(document.pages[0].spans.len(), 2);
    assert_eq!(document.pages[0].spans[1].text, "١٢٣");
    Ok(())
}

#[test]
fn test_readLayout_withKnownSourceFile_shouldKeepIt() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = create_test_file(
        dir.path(),
        "doc.json",
        r#"{"source_file":"annual-report.pdf","pages":[]}"#,
    )?;

    let document = FileManager::read_layout(&path)?;
    assert_eq!(document.source_file.as_deref(), Some("annual-report.pdf"));
    Ok(())
}

#[test]
fn test_readLayout_withInvalidJson_shouldFail() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = create_test_file(dir.path(), "doc.json", r#"{"pages": 3}"#)?;
    assert!(FileManager::read_layout(&path).is_err());
    assert!(FileManager::read_layout(dir.path().join("missing.json")).is_err());
    Ok(())
}

#[test]
fn test_detectFileType_withNonJson_shouldBeUnknown() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = create_test_file(dir.path(), "statement.pdf", "%PDF-1.7")?;
    assert_eq!(FileManager::detect_file_type(&path)?, FileType::Unknown);
    assert!(FileManager::detect_file_type(dir.path().join("gone.json")).is_err());
    Ok(())
}

#[test]
fn test_writeJson_shouldCreateParentAndPrettyPrint() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("reports/out.json");

    FileManager::write_json(&path, &serde_json::json!({"pages": []}))?;

    assert!(FileManager::file_exists(&path));
    let content = FileManager::read_to_string(&path)?;
    assert!(content.contains("\"pages\""));
    assert_eq!(FileManager::detect_file_type(&path)?, FileType::Layout);
    Ok(())
}

#[test]
fn test_findLayoutFiles_shouldReturnSortedLayouts() -> Result<()> {
    let dir = create_temp_dir()?;
    write_layout(dir.path(), "b.json", &minimal_document())?;
    write_layout(dir.path(), "a.json", &minimal_document())?;
    create_test_file(dir.path(), "conf.json", r#"{"log_level":"info"}"#)?;

    let files = FileManager::find_layout_files(dir.path())?;

    let names: Vec<String> = files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.json", "b.json"]);
    Ok(())
}
