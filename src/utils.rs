// ABOUTME: Utility functions for the slidegen application
// ABOUTME: Path resolution, companion file naming and output directory preparation

use crate::errors::{Result, SlideError};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Create the directory slide images are written to, and make sure a file can
/// actually be written there before any remote call is spent.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| {
        SlideError::ValidationError(format!("Cannot create output directory {:?}: {}", dir, e))
    })?;

    let marker = dir.join(format!(".slidegen_{}.tmp", Uuid::new_v4()));
    fs::write(&marker, b"").map_err(|e| {
        SlideError::ValidationError(format!("Output directory {:?} is not writable: {}", dir, e))
    })?;
    if let Err(e) = fs::remove_file(&marker) {
        warn!("Could not remove {:?}: {}", marker, e);
    }
    Ok(())
}

/// Resolve `path` against `root` unless it is already absolute
pub fn resolve_path(root: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// The companion name for an enlarged image: `<stem>_4k<suffix>`
pub fn enlarged_file_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    Some(format!("{}_4k{}", stem, suffix))
}
