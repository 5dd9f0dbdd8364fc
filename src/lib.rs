/*!
convexify
=========

**convexify** post-processes an MJCF scene file so that every non-convex
collision mesh is replaced by a set of convex sub-meshes, as required by
physics engines that only accept convex collision geometry.

The pipeline discovers the collision geoms of the scene, resolves their mesh
assets on disk, runs an approximate convex decomposition (VHACD, as
implemented by `parry3d`) on each distinct mesh in parallel, writes the
resulting convex parts next to the source mesh, and rewrites the scene's
asset catalog and body geometries so every reference stays consistent.

Meshes that are already convex are left completely untouched, which makes
the tool idempotent: running it over its own output changes nothing.
*/

#![deny(non_camel_case_types)]
#![deny(unused_parens)]
#![warn(missing_docs)]

pub mod decomposition;
pub mod document;
pub mod mesh_io;
pub mod pipeline;

pub use crate::document::{DocumentError, SceneDocument};
pub use crate::pipeline::{run, PipelineConfig, RunSummary};
