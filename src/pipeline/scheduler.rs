//! Sizing and dispatch of the decomposition worker pool.

use super::job::{DecompositionJob, JobOutcome, PartMesh, SkipReason};
use super::worker::process_job;
use log::{info, warn};
use parry3d::transformation::vhacd::VHACDParameters;
use rayon::prelude::*;
use std::collections::HashMap;

/// Number of cores left free when sizing the pool from the machine's
/// available parallelism. Ignored when a worker count is requested
/// explicitly.
const RESERVED_CORES: usize = 2;

/// Parallelism assumed when the machine's capacity cannot be queried.
const FALLBACK_PARALLELISM: usize = 4;

/// Aggregate outcome of one scheduler run.
///
/// Merged into maps keyed by mesh name, so job completion order is
/// irrelevant to the result.
#[derive(Debug, Default)]
pub struct DecompositionResults {
    /// Meshes decomposed into two or more parts, with their part lists in
    /// decomposition order. This is the sole input of the document
    /// rewriting passes.
    pub decomposed: HashMap<String, Vec<PartMesh>>,
    /// Jobs that produced no decomposition, with the reason.
    pub skipped: Vec<(String, SkipReason)>,
}

/// Computes the number of workers for a run: the requested override if any,
/// otherwise the available parallelism minus [`RESERVED_CORES`]; always at
/// least 1 and never more than one worker per job.
pub fn worker_count(requested: Option<usize>, job_count: usize) -> usize {
    let capacity = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_PARALLELISM);
    let wanted = requested.unwrap_or_else(|| capacity.saturating_sub(RESERVED_CORES));

    wanted.max(1).min(job_count.max(1))
}

/// Runs every job and collects the non-empty results.
///
/// With a single worker the jobs run sequentially in-process. Otherwise
/// they are distributed over a pool of exactly `workers` threads; the
/// collection of the parallel iterator is the synchronization barrier, so
/// no result is consumed before every job has finished.
pub fn run_jobs(
    jobs: &[DecompositionJob],
    params: &VHACDParameters,
    requested_workers: Option<usize>,
) -> DecompositionResults {
    let workers = worker_count(requested_workers, jobs.len());
    info!(
        "running {} decomposition jobs on {} workers",
        jobs.len(),
        workers
    );

    let outcomes: Vec<(String, JobOutcome)> = if workers == 1 {
        run_sequential(jobs, params)
    } else {
        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(|| {
                jobs.par_iter()
                    .map(|job| (job.mesh_name.clone(), process_job(job, params)))
                    .collect()
            }),
            Err(e) => {
                warn!("failed to start the worker pool ({e}), running sequentially");
                run_sequential(jobs, params)
            }
        }
    };

    let mut results = DecompositionResults::default();
    for (mesh_name, outcome) in outcomes {
        match outcome {
            JobOutcome::Decomposed(parts) => {
                let _ = results.decomposed.insert(mesh_name, parts);
            }
            JobOutcome::Skipped(reason) => results.skipped.push((mesh_name, reason)),
        }
    }

    results
}

fn run_sequential(
    jobs: &[DecompositionJob],
    params: &VHACDParameters,
) -> Vec<(String, JobOutcome)> {
    jobs.iter()
        .map(|job| (job.mesh_name.clone(), process_job(job, params)))
        .collect()
}
