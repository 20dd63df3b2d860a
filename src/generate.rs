// ABOUTME: Generation mode of the slidegen orchestrator
// ABOUTME: Builds slide jobs from outline records and renders them concurrently through the image service

use crate::config::DEFAULT_GENERATE_WORKERS;
use crate::errors::Result;
use crate::job::SlideJob;
use crate::outline::SlideRecord;
use crate::pool::{BatchReport, WorkerPool};
use crate::remote::{save_image, ImageRequest, ImageService, ReferenceImage};
use crate::utils::prepare_output_dir;
use log::info;
use std::path::PathBuf;

/// Configuration for a generation run
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Root against which relative asset paths are resolved
    pub project_root: PathBuf,
    pub output_dir: PathBuf,
    /// Visual guideline text shared by every slide
    pub guideline: String,
    pub workers: usize,
    pub image_size: String,
    pub aspect_ratio: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            output_dir: PathBuf::from("generated_slides"),
            guideline: String::new(),
            workers: DEFAULT_GENERATE_WORKERS,
            image_size: "1K".to_string(),
            aspect_ratio: "16:9".to_string(),
        }
    }
}

/// Build one job per record, in record order
pub fn build_jobs(records: &[SlideRecord], config: &GenerateConfig) -> Vec<SlideJob> {
    records
        .iter()
        .map(|record| {
            SlideJob::from_record(
                record,
                &config.guideline,
                &config.project_root,
                &config.output_dir,
            )
        })
        .collect()
}

/// Render a single job and write its image; returns the written path
pub fn render_job(
    job: &SlideJob,
    service: &dyn ImageService,
    config: &GenerateConfig,
) -> Result<PathBuf> {
    info!("Starting generation for Slide {}...", job.number);

    let reference_images = job
        .resolved_asset_paths
        .iter()
        .map(|path| ReferenceImage::from_path(path))
        .collect::<Result<Vec<_>>>()?;

    let request = ImageRequest {
        prompt: job.prompt.clone(),
        reference_images,
        image_size: config.image_size.clone(),
        aspect_ratio: config.aspect_ratio.clone(),
    };

    let image = service.generate(&request)?;
    let path = save_image(&job.output_prefix, 0, &image)?;
    info!("Finished Slide {}", job.number);
    Ok(path)
}

/// Generate one image per slide record.
///
/// Every job runs on the bounded pool and this call returns once all of them have
/// finished. A slide that fails is logged and reported; the others carry on.
pub fn generate_slides(
    records: &[SlideRecord],
    service: &dyn ImageService,
    config: &GenerateConfig,
) -> Result<BatchReport<PathBuf>> {
    prepare_output_dir(&config.output_dir)?;

    let jobs = build_jobs(records, config);
    info!(
        "Generating {} slides with {} workers into {:?}",
        jobs.len(),
        config.workers,
        config.output_dir
    );

    let labelled = jobs
        .into_iter()
        .map(|job| (format!("Slide {}", job.number), job))
        .collect();

    let report = WorkerPool::new(config.workers)
        .run(labelled, |job| render_job(&job, service, config))?;
    report.log_summary("Slide generation");
    Ok(report)
}
