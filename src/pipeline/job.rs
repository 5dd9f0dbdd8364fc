//! Unit of work handed to the decomposition worker pool.

use std::path::{Path, PathBuf};

/// One mesh queued for convex decomposition.
///
/// Jobs are immutable and independent of each other: no job observes
/// another job's state, which is what makes the pool safe to run them
/// concurrently.
#[derive(Clone, Debug)]
pub struct DecompositionJob {
    /// Name of the mesh in the scene's asset catalog.
    pub mesh_name: String,
    /// The `file` attribute stored on the asset entry, relative to
    /// [`mesh_dir`](Self::mesh_dir) unless absolute.
    pub stored_path: String,
    /// Base directory relative mesh paths resolve against.
    pub mesh_dir: PathBuf,
}

impl DecompositionJob {
    /// Resolves the stored path against the base mesh directory.
    ///
    /// This is pure path computation; existence is checked by the worker so
    /// a dangling path is reported per-job instead of aborting the run.
    pub fn resolved_path(&self) -> PathBuf {
        let stored = Path::new(&self.stored_path);
        if stored.is_absolute() {
            stored.to_path_buf()
        } else {
            self.mesh_dir.join(stored)
        }
    }
}

/// One convex part produced by decomposing a source mesh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartMesh {
    /// Unique asset name, `<mesh_stem>_part<i>` with `i` starting at 1.
    pub name: String,
    /// File path relative to the scene's mesh directory, keeping the
    /// source mesh's directory prefix.
    pub file: String,
}

/// Outcome of a single decomposition job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// The mesh was split into two or more convex parts, written to disk.
    Decomposed(Vec<PartMesh>),
    /// The mesh was left untouched.
    Skipped(SkipReason),
}

/// Why a job produced no decomposition. None of these abort the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The resolved mesh file does not exist on disk.
    MissingFile(PathBuf),
    /// The mesh file exists but could not be loaded.
    LoadFailed(String),
    /// The decomposition algorithm failed or returned nothing usable.
    DecompositionFailed(String),
    /// Decomposition produced at most one part, so the mesh is already
    /// convex and a no-op is the correct outcome.
    AlreadyConvex,
    /// No part could be exported, either because every part file failed to
    /// write or because no part name could be derived from the source path.
    ExportFailed,
}
