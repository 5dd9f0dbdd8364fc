//! End-to-end orchestration of the mesh-decomposition pipeline.

pub use self::job::{DecompositionJob, JobOutcome, PartMesh, SkipReason};
pub use self::scheduler::{run_jobs, worker_count, DecompositionResults};
pub use self::worker::process_job;

use crate::document::{self, DocumentError, SceneDocument};
use log::{info, warn};
use parry3d::transformation::vhacd::VHACDParameters;
use std::path::Path;

mod job;
mod scheduler;
mod worker;

/// Pipeline configuration, resolved once at startup and passed down
/// explicitly.
#[derive(Clone, Debug, Default)]
pub struct PipelineConfig {
    /// Worker-count override. When `None` the pool is sized from the
    /// machine's available parallelism.
    pub max_workers: Option<usize>,
    /// Parameters forwarded to the convex decomposition algorithm.
    pub vhacd: VHACDParameters,
}

/// Summary of one pipeline run, suitable for asserting on outcomes.
#[derive(Debug)]
pub struct RunSummary {
    /// Number of meshes replaced by convex parts.
    pub decomposed: usize,
    /// Jobs that produced no decomposition, with the reason.
    pub skipped: Vec<(String, SkipReason)>,
    /// Mesh names referenced by collision geoms but missing from the asset
    /// catalog.
    pub missing_assets: Vec<String>,
}

/// Runs the whole pipeline against the scene file at `mjcf_path`,
/// rewriting it in place.
///
/// Only document-level parse/serialize failures are returned as errors;
/// every per-mesh condition is contained in the [`RunSummary`].
pub fn run(mjcf_path: &Path, config: &PipelineConfig) -> Result<RunSummary, DocumentError> {
    let mut doc = SceneDocument::load(mjcf_path)?;
    doc.force_local_meshdir();
    doc.ensure_asset_catalog();

    let mesh_dir = doc.mesh_dir();
    let assets = doc.mesh_assets();

    let mut jobs = Vec::new();
    let mut missing_assets = Vec::new();
    for mesh_name in doc.collision_mesh_names() {
        match assets.get(&mesh_name) {
            Some(stored_path) => jobs.push(DecompositionJob {
                mesh_name,
                stored_path: stored_path.clone(),
                mesh_dir: mesh_dir.clone(),
            }),
            None => {
                warn!("mesh {mesh_name} not found in the asset catalog");
                missing_assets.push(mesh_name);
            }
        }
    }

    if jobs.is_empty() {
        info!("no meshes to process for convex decomposition");
        // The forced meshdir still has to be persisted.
        doc.save()?;
        return Ok(RunSummary {
            decomposed: 0,
            skipped: Vec::new(),
            missing_assets,
        });
    }

    let results = run_jobs(&jobs, &config.vhacd, config.max_workers);
    info!(
        "successfully processed {} of {} meshes with convex decomposition",
        results.decomposed.len(),
        jobs.len()
    );

    // The document is only mutated here, strictly after the scheduler
    // barrier, with the complete result set.
    document::rewrite_assets(&mut doc, &results.decomposed);
    document::expand_geoms(&mut doc, &results.decomposed);
    doc.save()?;

    Ok(RunSummary {
        decomposed: results.decomposed.len(),
        skipped: results.skipped,
        missing_assets,
    })
}
