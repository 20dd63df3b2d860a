// ABOUTME: Slide job construction for the slidegen application
// ABOUTME: Turns a parsed slide record into a prompt, resolved reference assets and an output prefix

use crate::outline::SlideRecord;
use crate::utils::resolve_path;
use log::{info, warn};
use std::path::{Path, PathBuf};

const ROLE_PREAMBLE: &str = "You are an expert presentation designer for a high-end tech keynote.";

const TASK_INSTRUCTION: &str = "Generate a high-resolution, 16:9 slide image that perfectly represents the content above while strictly adhering to the visual guidelines.
The image should be the final slide itself, including any text or graphical elements described.
Make it look like a professional slide from a Keynote presentation.";

/// One unit of generation work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideJob {
    pub number: u32,
    pub prompt: String,
    /// Existing reference images, in outline order
    pub resolved_asset_paths: Vec<PathBuf>,
    /// Output path without index or extension, e.g. `out/slide_07`
    pub output_prefix: PathBuf,
}

/// `slide_<NN>` with at least two digits
pub fn output_prefix_name(number: u32) -> String {
    format!("slide_{:02}", number)
}

/// Base prompt for a slide, before any asset notes
pub fn build_prompt(guideline: &str, content: &str) -> String {
    format!(
        "{}\n\nVISUAL GUIDELINES (MUST FOLLOW):\n{}\n\nSLIDE CONTENT:\n{}\n\nTASK:\n{}\n",
        ROLE_PREAMBLE,
        guideline.trim(),
        content,
        TASK_INSTRUCTION
    )
}

fn asset_note(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    format!(
        "\nNOTE: Incorporate the provided reference image ({}) into the design as described.",
        name
    )
}

impl SlideJob {
    /// Build the job for `record`. Assets missing on disk are dropped with a warning.
    pub fn from_record(
        record: &SlideRecord,
        guideline: &str,
        project_root: &Path,
        output_dir: &Path,
    ) -> Self {
        let mut prompt = build_prompt(guideline, &record.raw_content);
        let mut resolved_asset_paths = Vec::with_capacity(record.asset_paths.len());

        for asset in &record.asset_paths {
            let path = resolve_path(project_root, asset);
            if path.exists() {
                info!("  Using asset: {:?}", path);
                prompt.push_str(&asset_note(&path));
                resolved_asset_paths.push(path);
            } else {
                warn!(
                    "Slide {}: asset file not found at {:?}. Skipping this asset.",
                    record.number, path
                );
            }
        }

        Self {
            number: record.number,
            prompt,
            resolved_asset_paths,
            output_prefix: output_dir.join(output_prefix_name(record.number)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_prefix_is_zero_padded() {
        assert_eq!(output_prefix_name(7), "slide_07");
        assert_eq!(output_prefix_name(11), "slide_11");
        assert_eq!(output_prefix_name(123), "slide_123");
    }

    #[test]
    fn test_prompt_sections_in_order() {
        let prompt = build_prompt("Dark theme", "#### Slide 1: Hello");
        let role = prompt.find("expert presentation designer").unwrap();
        let guide = prompt.find("Dark theme").unwrap();
        let content = prompt.find("#### Slide 1: Hello").unwrap();
        let task = prompt.find("TASK:").unwrap();
        assert!(role < guide && guide < content && content < task);
    }

    #[test]
    fn test_asset_note_uses_file_name() {
        let note = asset_note(Path::new("/project/assets/chart.png"));
        assert!(note.contains("(chart.png)"));
        assert!(!note.contains("/project"));
    }
}
