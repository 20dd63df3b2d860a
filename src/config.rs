// ABOUTME: Configuration module for the slidegen application
// ABOUTME: Provides configuration settings, .env loading and environment variable handling

use crate::enlarge::EnlargeConfig;
use crate::errors::{Result, SlideError};
use crate::generate::GenerateConfig;
use log::{debug, warn};
use std::collections::BTreeSet;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_GENERATE_WORKERS: usize = 4;
pub const DEFAULT_ENLARGE_WORKERS: usize = 2;

/// Configuration shared by every run, threaded into the orchestrator and the
/// remote client at construction time
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub generate_workers: usize,
    pub enlarge_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            generate_workers: DEFAULT_GENERATE_WORKERS,
            enlarge_workers: DEFAULT_ENLARGE_WORKERS,
        }
    }
}

fn positive_env(name: &str, default: usize) -> usize {
    match env::var(name) {
        Ok(value) => match value.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                warn!("Ignoring invalid {}={:?}, using {}", name, value, default);
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `<project_root>/.env` when present, then read the environment
    pub fn load(project_root: &Path) -> Self {
        let env_path = project_root.join(".env");
        if env_path.is_file() {
            match dotenv::from_path(&env_path) {
                Ok(()) => debug!("Loaded environment from {:?}", env_path),
                Err(e) => warn!("Failed to load {:?}: {}", env_path, e),
            }
        }
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty());
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_base = env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self {
            api_key,
            model,
            api_base,
            timeout_secs,
            generate_workers: positive_env("SLIDEGEN_WORKERS", DEFAULT_GENERATE_WORKERS),
            enlarge_workers: positive_env("SLIDEGEN_ENLARGE_WORKERS", DEFAULT_ENLARGE_WORKERS),
        }
    }

    /// The API key, or a configuration error when none is set
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            SlideError::ConfigError(
                "GEMINI_API_KEY environment variable not set (GOOGLE_API_KEY is also accepted)"
                    .to_string(),
            )
        })
    }

    /// Get a generation configuration with defaults from this config
    pub fn get_generate_config(
        &self,
        project_root: PathBuf,
        output_dir: PathBuf,
        guideline: String,
        workers: Option<usize>,
    ) -> GenerateConfig {
        GenerateConfig {
            project_root,
            output_dir,
            guideline,
            workers: workers.unwrap_or(self.generate_workers),
            ..GenerateConfig::default()
        }
    }

    /// Get an enlarge configuration with defaults from this config
    pub fn get_enlarge_config(
        &self,
        output_dir: PathBuf,
        slides: Option<BTreeSet<u32>>,
        workers: Option<usize>,
    ) -> EnlargeConfig {
        EnlargeConfig {
            output_dir,
            slides,
            workers: workers.unwrap_or(self.enlarge_workers),
            ..EnlargeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_config_error() {
        let config = Config::new();
        let err = config.api_key().unwrap_err();
        assert!(matches!(err, SlideError::ConfigError(_)));
    }

    #[test]
    fn test_run_configs_use_pool_defaults() {
        let config = Config {
            generate_workers: 5,
            enlarge_workers: 3,
            ..Config::default()
        };
        let generate = config.get_generate_config(
            PathBuf::from("."),
            PathBuf::from("out"),
            "guide".to_string(),
            None,
        );
        assert_eq!(generate.workers, 5);
        assert_eq!(generate.image_size, "1K");

        let enlarge = config.get_enlarge_config(PathBuf::from("out"), None, Some(7));
        assert_eq!(enlarge.workers, 7);
        assert_eq!(enlarge.image_size, "4K");
    }
}
