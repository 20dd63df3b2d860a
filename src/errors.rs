// ABOUTME: Error types for the slidegen application
// ABOUTME: Provides structured error handling for parsing, configuration and remote calls

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlideError {
    #[error("Failed to read or write file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid JSON payload: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid base64 image data: {0}")]
    DecodeError(#[from] base64::DecodeError),

    #[error("Remote image service error: {0}")]
    RemoteError(String),

    #[error("Remote image service returned {status}: {body}")]
    RemoteStatusError { status: u16, body: String },

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Path not found: {0}")]
    PathNotFoundError(PathBuf),

    #[error("Slide {0} appears more than once in the outline")]
    DuplicateSlide(u32),

    #[error("Invalid glob pattern: {0}")]
    PatternError(#[from] glob::PatternError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Job panicked: {0}")]
    JobPanicked(String),

    #[error("Failed to start worker pool: {0}")]
    PoolError(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, SlideError>;
