//! Approximate convex decomposition of a triangle mesh.

use crate::mesh_io::MeshBuffers;
use parry3d::transformation::vhacd::{VHACD, VHACDParameters};

/// Decomposes a mesh into convex parts using VHACD.
///
/// Returns one buffer per convex part. An input that is already convex
/// yields a single part, which callers treat as "nothing to do".
pub fn decompose(mesh: &MeshBuffers, params: &VHACDParameters) -> Vec<MeshBuffers> {
    let vhacd = VHACD::decompose(params, &mesh.vertices, &mesh.indices, true);

    vhacd
        .compute_exact_convex_hulls(&mesh.vertices, &mesh.indices)
        .into_iter()
        .map(|(vertices, indices)| MeshBuffers { vertices, indices })
        .collect()
}
