// ABOUTME: Main entry point for the slidegen program.
// ABOUTME: Provides CLI interface and executes generation and enlargement runs from the library.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::warn;
use slidegen::outline::{DEFAULT_FIRST_SLIDE, DEFAULT_LAST_SLIDE};
use slidegen::utils::resolve_path;
use slidegen::{Config, GeminiClient, Selection, SlideError};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate slide images from the outline
    Generate(GenerateArgs),

    /// Enlarge previously generated slides to 4K
    Enlarge(EnlargeArgs),

    /// Upscale explicit image files to 4K
    Upscale(UpscaleArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Project root; relative paths (outline, assets, output) resolve against it
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Path to the outline document
    #[arg(long, default_value = "outline_visual.md")]
    outline: PathBuf,

    /// Path to the visual guideline document
    #[arg(long, default_value = "visual_guideline.md")]
    guideline: PathBuf,

    /// Directory for generated images
    #[arg(short, long, default_value = "generated_slides")]
    output_dir: PathBuf,

    /// Specific slide numbers to generate (e.g. --slides 8 11); overrides the range
    #[arg(long, num_args = 1..)]
    slides: Option<Vec<u32>>,

    /// First slide of the range
    #[arg(long, default_value_t = DEFAULT_FIRST_SLIDE)]
    start: u32,

    /// Last slide of the range
    #[arg(long, default_value_t = DEFAULT_LAST_SLIDE)]
    end: u32,

    /// Number of concurrent generation jobs
    #[arg(short, long)]
    workers: Option<usize>,
}

#[derive(Args)]
struct EnlargeArgs {
    /// Project root, used for .env loading and relative paths
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Directory holding the generated slides
    #[arg(short, long, default_value = "generated_slides")]
    output_dir: PathBuf,

    /// Specific slide numbers to enlarge (e.g. --slides 8 11)
    #[arg(long, num_args = 1..)]
    slides: Option<Vec<u32>>,

    /// Number of concurrent upscale jobs
    #[arg(short, long)]
    workers: Option<usize>,
}

#[derive(Args)]
struct UpscaleArgs {
    /// Input image paths
    #[arg(short, long, num_args = 1.., required = true)]
    input: Vec<PathBuf>,

    /// Output image paths, one per input
    #[arg(short, long, num_args = 1.., required = true)]
    output: Vec<PathBuf>,

    /// Project root, used for .env loading
    #[arg(long, default_value = ".")]
    project_root: PathBuf,

    /// Number of concurrent upscale jobs
    #[arg(short, long)]
    workers: Option<usize>,
}

fn check_workers(workers: Option<usize>) -> slidegen::Result<Option<usize>> {
    match workers {
        Some(0) => Err(SlideError::ConfigError("--workers must be at least 1".to_string())),
        other => Ok(other),
    }
}

fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let root = &args.project_root;
    let config = Config::load(root);
    let workers = check_workers(args.workers)?;
    if args.slides.is_none() && args.start > args.end {
        return Err(SlideError::ConfigError(format!(
            "--start {} is greater than --end {}",
            args.start, args.end
        ))
        .into());
    }

    let client = GeminiClient::new(&config)?;

    let guideline_path = resolve_path(root, &args.guideline);
    let guideline = fs::read_to_string(&guideline_path)
        .with_context(|| format!("Failed to read guideline {:?}", guideline_path))?;

    let selection = Selection::new(args.slides.as_deref(), args.start..=args.end);
    let records = slidegen::parse_outline_file(&resolve_path(root, &args.outline), &selection)?;
    if records.is_empty() {
        warn!("No slides in the outline match the selection");
        println!("Found 0 slides to generate.");
        return Ok(());
    }
    println!("Found {} slides to generate.", records.len());

    let output_dir = resolve_path(root, &args.output_dir);
    let generate_config = config.get_generate_config(root.clone(), output_dir, guideline, workers);
    let report = slidegen::generate_slides(&records, &client, &generate_config)?;

    println!(
        "Generated {} of {} slides ({} failed)",
        report.succeeded(),
        report.total(),
        report.failed()
    );
    Ok(())
}

fn run_enlarge(args: &EnlargeArgs) -> anyhow::Result<()> {
    let root = &args.project_root;
    let config = Config::load(root);
    let workers = check_workers(args.workers)?;
    let client = GeminiClient::new(&config)?;

    let slides: Option<BTreeSet<u32>> = args
        .slides
        .as_ref()
        .filter(|list| !list.is_empty())
        .map(|list| list.iter().copied().collect());
    let output_dir = resolve_path(root, &args.output_dir);
    let enlarge_config = config.get_enlarge_config(output_dir, slides, workers);

    let report = slidegen::enlarge_slides(&client, &enlarge_config)?;
    println!(
        "Enlarged {} of {} slides ({} failed)",
        report.succeeded(),
        report.total(),
        report.failed()
    );
    Ok(())
}

fn run_upscale(args: &UpscaleArgs) -> anyhow::Result<()> {
    let config = Config::load(&args.project_root);
    let workers = check_workers(args.workers)?;
    let client = GeminiClient::new(&config)?;

    let upscale_config = config.get_enlarge_config(PathBuf::new(), None, workers);
    let report = slidegen::upscale_files(&args.input, &args.output, &client, &upscale_config)?;
    println!(
        "Upscaled {} of {} images ({} failed)",
        report.succeeded(),
        report.total(),
        report.failed()
    );
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Generate(args)) => run_generate(args),
        Some(Commands::Enlarge(args)) => run_enlarge(args),
        Some(Commands::Upscale(args)) => run_upscale(args),
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
