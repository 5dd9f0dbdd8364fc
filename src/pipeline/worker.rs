//! Per-job mesh decomposition: resolve, load, decompose, export.

use super::job::{DecompositionJob, JobOutcome, PartMesh, SkipReason};
use crate::decomposition;
use crate::mesh_io::{self, MeshFormat};
use log::{error, info, warn};
use parry3d::transformation::vhacd::VHACDParameters;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Processes one decomposition job.
///
/// Every failure mode is contained in the returned [`JobOutcome`]; nothing
/// escapes to abort the run. The only side effects are the part files
/// written under the source mesh's own `<stem>_parts/` directory, so
/// concurrent invocations never touch the same path.
pub fn process_job(job: &DecompositionJob, params: &VHACDParameters) -> JobOutcome {
    let source = job.resolved_path();
    if !source.exists() {
        warn!(
            "mesh file {} does not exist at {}",
            job.stored_path,
            source.display()
        );
        return JobOutcome::Skipped(SkipReason::MissingFile(source));
    }

    info!("processing mesh {} for convex decomposition", job.mesh_name);

    let format = match MeshFormat::from_path(&source) {
        Ok(format) => format,
        Err(e) => {
            error!("cannot load mesh {}: {e}", job.mesh_name);
            return JobOutcome::Skipped(SkipReason::LoadFailed(e.to_string()));
        }
    };
    let mesh = match mesh_io::load_mesh(&source) {
        Ok(mesh) => mesh,
        Err(e) => {
            error!("failed to load mesh {}: {e}", source.display());
            return JobOutcome::Skipped(SkipReason::LoadFailed(e.to_string()));
        }
    };

    // VHACD has no error channel; a panic on degenerate input must not take
    // down the whole run.
    let parts = match panic::catch_unwind(AssertUnwindSafe(|| decomposition::decompose(&mesh, params)))
    {
        Ok(parts) => parts,
        Err(_) => {
            error!("failed to decompose mesh {}", job.mesh_name);
            return JobOutcome::Skipped(SkipReason::DecompositionFailed(
                "the decomposition algorithm panicked".to_string(),
            ));
        }
    };

    info!("mesh {} decomposed into {} parts", job.mesh_name, parts.len());

    if parts.len() <= 1 {
        info!(
            "mesh {} is already convex ({} part), skipping",
            job.mesh_name,
            parts.len()
        );
        return JobOutcome::Skipped(SkipReason::AlreadyConvex);
    }

    let stem = match part_stem(&source) {
        Some(stem) => stem.to_string(),
        None => {
            error!("mesh path {} has no usable file stem", source.display());
            return JobOutcome::Skipped(SkipReason::ExportFailed);
        }
    };

    let parts_dir_name = format!("{stem}_parts");
    let parts_dir = source
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&parts_dir_name);
    if let Err(e) = std::fs::create_dir_all(&parts_dir) {
        error!("failed to create {}: {e}", parts_dir.display());
        return JobOutcome::Skipped(SkipReason::ExportFailed);
    }

    // The stored path's directory prefix is kept so the document's meshdir
    // does not need to change for decomposed meshes.
    let stored_dir = Path::new(&job.stored_path)
        .parent()
        .unwrap_or_else(|| Path::new(""));

    let mut part_info = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        let part_name = format!("{stem}_part{}", i + 1);
        let filename = format!("{part_name}.{}", format.extension());
        let part_path = parts_dir.join(&filename);

        // Export failures are isolated: a failed part is dropped, its
        // siblings are still returned.
        match mesh_io::export_mesh(part, &part_path) {
            Ok(()) => {
                let file = stored_dir
                    .join(&parts_dir_name)
                    .join(&filename)
                    .display()
                    .to_string();
                info!("saved part {} to {file}", i + 1);
                part_info.push(PartMesh { name: part_name, file });
            }
            Err(e) => {
                error!(
                    "failed to save part {} of mesh {}: {e}",
                    i + 1,
                    job.mesh_name
                );
            }
        }
    }

    if part_info.is_empty() {
        JobOutcome::Skipped(SkipReason::ExportFailed)
    } else {
        JobOutcome::Decomposed(part_info)
    }
}

/// Stem used to name the parts directory and each exported part.
///
/// A path that passed format detection always has one; the `Option` only
/// covers paths that never can.
fn part_stem(source: &Path) -> Option<&str> {
    source.file_stem().and_then(|s| s.to_str())
}
