// ABOUTME: Enlarge (upscale) mode of the slidegen orchestrator
// ABOUTME: Finds generated slide images and regenerates each one at 4K as a companion file

use crate::config::DEFAULT_ENLARGE_WORKERS;
use crate::errors::{Result, SlideError};
use crate::pool::{BatchReport, WorkerPool};
use crate::remote::{ImageRequest, ImageService, ReferenceImage};
use crate::utils::{enlarged_file_name, prepare_output_dir};
use log::{debug, info};
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const UPSCALE_PROMPT: &str = "Upscale this image to 4K resolution. Maintain all details, text, and structure exactly. Do not add or remove elements. Just increase the resolution and sharpness.";

/// File name pattern of the first variant of a generated slide
pub const FIRST_VARIANT_PATTERN: &str = "slide_*_0.jpg";

fn first_variant_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^slide_(\d+)_0\.jpg$").expect("first variant regex"))
}

/// Configuration for an enlarge run
#[derive(Debug, Clone)]
pub struct EnlargeConfig {
    pub output_dir: PathBuf,
    /// Only enlarge these slide numbers; all discovered slides when `None`
    pub slides: Option<BTreeSet<u32>>,
    pub workers: usize,
    pub image_size: String,
    pub aspect_ratio: String,
}

impl Default for EnlargeConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated_slides"),
            slides: None,
            workers: DEFAULT_ENLARGE_WORKERS,
            image_size: "4K".to_string(),
            aspect_ratio: "16:9".to_string(),
        }
    }
}

/// Slide number embedded in a `slide_<NN>_0.jpg` file name
pub fn slide_number(path: &Path) -> Option<u32> {
    let name = path.file_name()?.to_str()?;
    first_variant_name().captures(name)?[1].parse().ok()
}

/// Find first-variant slide images in `dir`, sorted by path.
/// With `slides`, only files whose slide number is in the set are kept.
pub fn find_slide_images(dir: &Path, slides: Option<&BTreeSet<u32>>) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SlideError::PathNotFoundError(dir.to_path_buf()));
    }

    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        FIRST_VARIANT_PATTERN
    );
    let mut files: Vec<PathBuf> = glob::glob(&pattern)?
        .flatten()
        .filter(|path| match slide_number(path) {
            Some(n) => slides.map_or(true, |set| set.contains(&n)),
            None => {
                debug!("Ignoring {:?}: not a slide image", path);
                false
            }
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Companion output path for `input` inside `output_dir`
pub fn enlarged_path(input: &Path, output_dir: &Path) -> Result<PathBuf> {
    enlarged_file_name(input)
        .map(|name| output_dir.join(name))
        .ok_or_else(|| {
            SlideError::ValidationError(format!("Not an image file path: {:?}", input))
        })
}

/// Regenerate `input` at the configured size and write it to `output`
pub fn upscale_image(
    input: &Path,
    output: &Path,
    service: &dyn ImageService,
    config: &EnlargeConfig,
) -> Result<PathBuf> {
    info!("Upscaling {:?} to {}...", input, config.image_size);

    let request = ImageRequest {
        prompt: UPSCALE_PROMPT.to_string(),
        reference_images: vec![ReferenceImage::from_path(input)?],
        image_size: config.image_size.clone(),
        aspect_ratio: config.aspect_ratio.clone(),
    };
    let image = service.generate(&request)?;

    fs::write(output, &image.data).map_err(SlideError::FileError)?;
    info!("File saved to: {:?}", output);
    Ok(output.to_path_buf())
}

fn run_pairs(
    pairs: Vec<(PathBuf, PathBuf)>,
    service: &dyn ImageService,
    config: &EnlargeConfig,
) -> Result<BatchReport<PathBuf>> {
    let labelled = pairs
        .into_iter()
        .map(|(input, output)| {
            let label = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.to_string_lossy().into_owned());
            (label, (input, output))
        })
        .collect();

    WorkerPool::new(config.workers).run(labelled, |(input, output): (PathBuf, PathBuf)| {
        info!("Enlarging {:?} -> {:?}...", input.file_name(), output.file_name());
        upscale_image(&input, &output, service, config)
    })
}

/// Enlarge every generated slide in the output directory (or the selected subset).
///
/// The output directory is created when missing, which yields an empty batch.
/// Each file is its own job; a failure is logged and the rest still run.
/// Re-running overwrites the same `_4k` companions.
pub fn enlarge_slides(
    service: &dyn ImageService,
    config: &EnlargeConfig,
) -> Result<BatchReport<PathBuf>> {
    info!("Starting batch enlargement...");
    prepare_output_dir(&config.output_dir)?;

    let files = find_slide_images(&config.output_dir, config.slides.as_ref())?;
    info!("Found {} slides to enlarge.", files.len());

    let pairs = files
        .into_iter()
        .map(|input| {
            let output = enlarged_path(&input, &config.output_dir)?;
            Ok((input, output))
        })
        .collect::<Result<Vec<_>>>()?;

    let report = run_pairs(pairs, service, config)?;
    report.log_summary("Batch enlargement complete");
    Ok(report)
}

/// Upscale explicit input files to explicit output files, pairwise.
/// The two lists must have the same, non-zero length.
pub fn upscale_files(
    inputs: &[PathBuf],
    outputs: &[PathBuf],
    service: &dyn ImageService,
    config: &EnlargeConfig,
) -> Result<BatchReport<PathBuf>> {
    if inputs.is_empty() {
        return Err(SlideError::ConfigError("No input images given".to_string()));
    }
    if inputs.len() != outputs.len() {
        return Err(SlideError::ConfigError(format!(
            "Got {} input images but {} output paths",
            inputs.len(),
            outputs.len()
        )));
    }

    for output in outputs {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            prepare_output_dir(parent)?;
        }
    }

    let pairs = inputs.iter().cloned().zip(outputs.iter().cloned()).collect();
    let report = run_pairs(pairs, service, config)?;
    report.log_summary("Upscale complete");
    Ok(report)
}
