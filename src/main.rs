use clap::Parser;
use convexify::{run, PipelineConfig};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// Replaces non-convex collision meshes of an MJCF scene with convex
/// decompositions.
#[derive(Parser)]
#[command(name = "convexify", version, about)]
struct Args {
    /// Path to the MJCF scene file, rewritten in place.
    mjcf_path: PathBuf,

    /// Number of decomposition workers. Defaults to the available cores
    /// minus a small reserve.
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = PipelineConfig {
        max_workers: args.workers,
        ..PipelineConfig::default()
    };

    match run(&args.mjcf_path, &config) {
        Ok(summary) => {
            info!(
                "decomposed {} meshes ({} skipped, {} missing asset references)",
                summary.decomposed,
                summary.skipped.len(),
                summary.missing_assets.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
