// ABOUTME: Library module for the slidegen program.
// ABOUTME: Contains outline parsing, job construction and the concurrent generation orchestrator.

// Reexport modules
pub mod assets;
pub mod config;
pub mod enlarge;
pub mod errors;
pub mod generate;
pub mod job;
pub mod outline;
pub mod pool;
pub mod remote;
pub mod utils;

// Reexport common types and functions
pub use assets::extract_assets;
pub use config::Config;
pub use enlarge::{enlarge_slides, find_slide_images, upscale_files, EnlargeConfig};
pub use errors::{Result, SlideError};
pub use generate::{generate_slides, GenerateConfig};
pub use job::SlideJob;
pub use outline::{parse_outline, parse_outline_file, Selection, SlideRecord};
pub use pool::{BatchReport, JobOutcome, WorkerPool};
pub use remote::{GeminiClient, GeneratedImage, ImageRequest, ImageService, ReferenceImage};
