use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::layout::LayoutDocument;
use crate::render::RenderPlan;
use crate::translation::core::ModelService;
use crate::translation::pipeline::{
    DocumentStats, PipelineConfig, PipelineProgress, ProgressCallback, Segment, TranslationPipeline,
};

// @module: Application controller for document translation

/// Report written next to every translated layout document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationReport {
    /// Random v4 UUID identifying this run
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub source_language: String,
    pub target_language: String,
    pub render_plan: RenderPlan,
    pub stats: DocumentStats,
    pub segments: Vec<Segment>,
    pub full_text: String,
}

/// Outcome counters of a folder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub errors: usize,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Pipeline bound to the shared model service
    pipeline: TranslationPipeline,
}

impl Controller {
    // @method: Create a controller talking to the HTTP model described by the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let service = ModelService::from_config(&config)?;
        Self::with_service(config, Arc::new(service))
    }

    // @method: Create a controller around an existing model service
    pub fn with_service(config: Config, service: Arc<ModelService>) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        let pipeline_config = PipelineConfig::from_config(&config)?;
        let pipeline = TranslationPipeline::new(service, pipeline_config)
            .context("Failed to build translation pipeline")?;

        Ok(Self { config, pipeline })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate one in-memory layout document
    pub async fn translate_document(&self, document: &LayoutDocument) -> Result<TranslationReport> {
        self.translate_with_callback(document, None).await
    }

    async fn translate_with_callback(
        &self,
        document: &LayoutDocument,
        progress: Option<&ProgressCallback>,
    ) -> Result<TranslationReport> {
        let result = self
            .pipeline
            .run_with_progress(document, progress)
            .await
            .context("Translation pipeline failed")?;

        if result.stats.fallbacks > 0 {
            warn!(
                "{} spans kept their original text after every decoding strategy failed",
                result.stats.fallbacks
            );
        }
        if result.stats.overflow_spans > 0 {
            warn!("{} spans overflow their box at the minimum font size", result.stats.overflow_spans);
        }

        Ok(TranslationReport {
            document_id: uuid::Uuid::new_v4().to_string(),
            source_file: document.source_file.clone(),
            source_language: self.config.source_language.clone(),
            target_language: self.config.target_language.clone(),
            render_plan: result.plan,
            stats: result.stats,
            segments: result.segments,
            full_text: result.full_text,
        })
    }

    /// Translate one layout file and write its report into `output_dir`.
    ///
    /// Returns `None` when the report already exists and `force_overwrite` is off.
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<Option<PathBuf>> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(input_file, output_dir, &multi_progress, force_overwrite)
            .await
    }

    /// Run the controller with progress reporting
    async fn run_with_progress(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<Option<PathBuf>> {
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        FileManager::ensure_dir(&output_dir)?;

        let output_path =
            FileManager::generate_output_path(&input_file, &output_dir, &self.config.target_language);
        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite)");
            return Ok(None);
        }

        let document = FileManager::read_layout(&input_file)?;
        info!(
            "Translating {} ({} pages, {} -> {})",
            input_file.display(),
            document.pages.len(),
            self.config.source_language,
            self.config.target_language
        );

        let spinner = multi_progress.add(ProgressBar::new_spinner());
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(120));

        let bar = spinner.clone();
        let callback: ProgressCallback = Box::new(move |progress: PipelineProgress| {
            bar.set_message(format!(
                "[{:>3.0}%] {}",
                progress.overall_progress * 100.0,
                progress.status
            ));
        });

        let report = self.translate_with_callback(&document, Some(&callback)).await;
        spinner.finish_and_clear();
        let report = report?;

        FileManager::write_json(&output_path, &report)?;

        info!("{}", report.stats.summary());
        info!(
            "Success: {} in {}",
            output_path.display(),
            Self::format_duration(start_time.elapsed())
        );

        Ok(Some(output_path))
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Run the workflow in folder mode, processing every layout document in a directory.
    /// Reports go to `output_dir` when given, otherwise next to each document.
    /// Documents that already have a report are skipped.
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        output_dir: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<FolderSummary> {
        let start_time = std::time::Instant::now();

        if !input_dir.exists() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let layout_files = FileManager::find_layout_files(&input_dir)?;
        if layout_files.is_empty() {
            return Err(anyhow!("No layout documents found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(layout_files.len() as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing documents");

        let mut summary = FolderSummary::default();

        for layout_file in &layout_files {
            let file_name = layout_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let output_dir = match &output_dir {
                Some(dir) => dir.clone(),
                None => layout_file
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| input_dir.clone()),
            };

            match self
                .run_with_progress(layout_file.clone(), output_dir, &multi_progress, force_overwrite)
                .await
            {
                Ok(Some(_)) => summary.processed += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.errors += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors in {}",
            summary.processed,
            summary.skipped,
            summary.errors,
            Self::format_duration(start_time.elapsed())
        );
        let cache = self.pipeline.service().cache().stats();
        info!(
            "Translation cache: {} entries, {} evicted, {:.0}% hit rate",
            cache.entries,
            cache.evictions,
            cache.hit_rate() * 100.0
        );

        Ok(summary)
    }
}
