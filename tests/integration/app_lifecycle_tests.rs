/*!
 * Controller lifecycle tests over real files
 */

use anyhow::Result;
use std::fs;

use finlate::app_config::Config;
use finlate::app_controller::{Controller, FolderSummary, TranslationReport};
use finlate::file_utils::{FileManager, FileType};
use finlate::providers::MockModel;
use finlate::translation::pipeline::Route;

use crate::common::{
    create_temp_dir, create_test_file, financial_mock, init_test_logging, minimal_document, mock_service, statement_document,
    write_layout,
};

fn controller_with(model: MockModel) -> Result<Controller> {
    Controller::with_service(Config::default(), mock_service(model))
}

fn read_report(path: &std::path::Path) -> Result<TranslationReport> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

#[tokio::test]
async fn test_run_shouldWriteReportNextToOutputDir() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = write_layout(dir.path(), "statement.json", &statement_document())?;
    let out_dir = dir.path().join("reports");
    let controller = controller_with(financial_mock())?;

    let written = controller.run(input, out_dir.clone(), false).await?;

    let report_path = written.expect("report should be written");
    assert_eq!(report_path, out_dir.join("statement.en.json"));
    assert_eq!(FileManager::detect_file_type(&report_path)?, FileType::Report);

    let report = read_report(&report_path)?;
    assert_eq!(report.source_language, "ar");
    assert_eq!(report.target_language, "en");
    assert_eq!(report.source_file.as_deref(), Some("statement.pdf"));
    assert_eq!(report.document_id.len(), 36);
    assert_eq!(report.stats.pages, 2);
    assert_eq!(report.stats.tables_translated, 1);
    assert_eq!(report.render_plan.ops.len(), 6);
    assert_eq!(report.segments.len(), 6);
    assert!(report.full_text.ends_with("\n\nLiabilities"));
    Ok(())
}

#[tokio::test]
async fn test_run_withExistingReport_shouldSkipUnlessForced() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = write_layout(dir.path(), "minimal.json", &minimal_document())?;
    let model = financial_mock();
    let controller = controller_with(model.clone())?;

    let first = controller.run(input.clone(), dir.path().to_path_buf(), false).await?;
    assert!(first.is_some());
    let calls_after_first = model.call_count();

    let skipped = controller.run(input.clone(), dir.path().to_path_buf(), false).await?;
    assert!(skipped.is_none());
    assert_eq!(model.call_count(), calls_after_first);

    let forced = controller.run(input, dir.path().to_path_buf(), true).await?;
    assert!(forced.is_some());
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let dir = create_temp_dir()?;
    let controller = controller_with(MockModel::working())?;

    let result = controller
        .run(dir.path().join("nope.json"), dir.path().to_path_buf(), false)
        .await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_runFolder_shouldProcessLayoutsAndCountOutcomes() -> Result<()> {
    init_test_logging();
    let dir = create_temp_dir()?;
    write_layout(dir.path(), "a.json", &minimal_document())?;
    write_layout(dir.path(), "b.json", &statement_document())?;
    create_test_file(dir.path(), "broken.json", r#"{"pages":[{"number":0,"width":1,"height":1}]}"#)?;
    create_test_file(dir.path(), "notes.txt", "not a layout")?;
    let controller = controller_with(financial_mock())?;

    let summary = controller.run_folder(dir.path().to_path_buf(), None, false).await?;

    assert_eq!(
        summary,
        FolderSummary {
            processed: 2,
            skipped: 0,
            errors: 1
        }
    );
    assert!(dir.path().join("a.en.json").exists());
    assert!(dir.path().join("b.en.json").exists());

    // Reports are not picked up as layouts on the next run
    let again = controller.run_folder(dir.path().to_path_buf(), None, false).await?;
    assert_eq!(again.skipped, 2);
    assert_eq!(again.processed, 0);
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withOutputDir_shouldWriteThere() -> Result<()> {
    let dir = create_temp_dir()?;
    let input_dir = dir.path().join("in");
    let output_dir = dir.path().join("out");
    fs::create_dir(&input_dir)?;
    write_layout(&input_dir, "minimal.json", &minimal_document())?;
    let controller = controller_with(financial_mock())?;

    let summary = controller.run_folder(input_dir, Some(output_dir.clone()), false).await?;

    assert_eq!(summary.processed, 1);
    assert!(output_dir.join("minimal.en.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_runFolder_withoutLayouts_shouldFail() -> Result<()> {
    let dir = create_temp_dir()?;
    create_test_file(dir.path(), "readme.txt", "nothing here")?;
    let controller = controller_with(MockModel::working())?;

    assert!(controller.run_folder(dir.path().to_path_buf(), None, false).await.is_err());
    Ok(())
}

#[test]
fn test_translateDocument_shouldGiveEachRunANewId() -> Result<()> {
    let controller = controller_with(financial_mock())?;

    let first = tokio_test::block_on(controller.translate_document(&minimal_document()))?;
    let second = tokio_test::block_on(controller.translate_document(&minimal_document()))?;

    assert_ne!(first.document_id, second.document_id);
    assert_eq!(first.render_plan.ops[0].route, Route::Model);
    assert_eq!(first.full_text, second.full_text);
    Ok(())
}

#[test]
fn test_withService_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.translation.batch_size = 0;
    assert!(Controller::with_service(config, mock_service(MockModel::working())).is_err());
}

#[test]
fn test_withConfig_shouldBuildHttpBackedController() -> Result<()> {
    let dir = create_temp_dir()?;
    let config = Config::load_or_create(&dir.path().join("conf.json"))?;

    let controller = Controller::with_config(config)?;
    assert_eq!(controller.config().model.endpoint, "http://localhost:8000");
    Ok(())
}
