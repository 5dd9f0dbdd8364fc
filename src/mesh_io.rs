//! Loading and export of triangle meshes in Wavefront OBJ and STL formats.

use nalgebra::Point3;
use obj::{Group, IndexTuple, ObjData, ObjError, Object, SimplePolygon};
use parry3d::math::Real;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Vertex and triangle-index buffers of a mesh, in the `(points, indices)`
/// convention used by `parry3d`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    /// The vertex buffer.
    pub vertices: Vec<Point3<Real>>,
    /// The index buffer, one entry per triangle.
    pub indices: Vec<[u32; 3]>,
}

/// A mesh file format supported by the loader and exporter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeshFormat {
    /// Wavefront OBJ (`.obj`).
    Obj,
    /// STL (`.stl`), binary or ASCII.
    Stl,
}

impl MeshFormat {
    /// Detects the format of a mesh file from its extension.
    pub fn from_path(path: &Path) -> Result<Self, MeshIoError> {
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("obj") => Ok(MeshFormat::Obj),
            Some("stl") => Ok(MeshFormat::Stl),
            _ => Err(MeshIoError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// The canonical file extension of this format.
    pub fn extension(self) -> &'static str {
        match self {
            MeshFormat::Obj => "obj",
            MeshFormat::Stl => "stl",
        }
    }
}

/// Error produced when loading or exporting a mesh file.
#[derive(thiserror::Error, Debug)]
pub enum MeshIoError {
    /// The file extension does not match any supported format.
    #[error("unsupported mesh format: {0:?}")]
    UnsupportedFormat(PathBuf),
    /// Reading or writing the file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The OBJ file is malformed.
    #[error("malformed OBJ file: {0}")]
    Obj(#[from] ObjError),
    /// The file parsed but contains no triangle.
    #[error("the mesh contains no triangle")]
    Empty,
}

/// Loads a mesh file, detecting its format from the file extension.
pub fn load_mesh(path: &Path) -> Result<MeshBuffers, MeshIoError> {
    let buffers = match MeshFormat::from_path(path)? {
        MeshFormat::Obj => load_obj(path)?,
        MeshFormat::Stl => load_stl(path)?,
    };

    if buffers.indices.is_empty() {
        return Err(MeshIoError::Empty);
    }

    Ok(buffers)
}

/// Writes a mesh file, detecting its format from the file extension.
pub fn export_mesh(mesh: &MeshBuffers, path: &Path) -> Result<(), MeshIoError> {
    match MeshFormat::from_path(path)? {
        MeshFormat::Obj => export_obj(mesh, path),
        MeshFormat::Stl => export_stl(mesh, path),
    }
}

fn load_obj(path: &Path) -> Result<MeshBuffers, MeshIoError> {
    let file = File::open(path)?;
    let data = ObjData::load_buf(BufReader::new(file))?;

    let vertices = data
        .position
        .iter()
        .map(|v| Point3::new(v[0] as Real, v[1] as Real, v[2] as Real))
        .collect();

    // Polygons with more than three vertices are fan-triangulated.
    let mut indices = Vec::new();
    for object in &data.objects {
        for group in &object.groups {
            for poly in &group.polys {
                let idx = &poly.0;
                for i in 2..idx.len() {
                    indices.push([idx[0].0 as u32, idx[i - 1].0 as u32, idx[i].0 as u32]);
                }
            }
        }
    }

    Ok(MeshBuffers { vertices, indices })
}

fn export_obj(mesh: &MeshBuffers, path: &Path) -> Result<(), MeshIoError> {
    let mut file = File::create(path)?;

    ObjData {
        position: mesh
            .vertices
            .iter()
            .map(|v| [v.x as f32, v.y as f32, v.z as f32])
            .collect(),
        objects: vec![Object {
            groups: vec![Group {
                polys: mesh
                    .indices
                    .iter()
                    .map(|tri| {
                        SimplePolygon(vec![
                            IndexTuple(tri[0] as usize, None, None),
                            IndexTuple(tri[1] as usize, None, None),
                            IndexTuple(tri[2] as usize, None, None),
                        ])
                    })
                    .collect(),
                name: "".to_string(),
                index: 0,
                material: None,
            }],
            name: "".to_string(),
        }],
        ..Default::default()
    }
    .write_to_buf(&mut file)?;

    Ok(())
}

fn load_stl(path: &Path) -> Result<MeshBuffers, MeshIoError> {
    let mut file = File::open(path)?;
    let stl = stl_io::read_stl(&mut file)?;

    let vertices = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as Real, v[1] as Real, v[2] as Real))
        .collect();
    let indices = stl
        .faces
        .iter()
        .map(|f| [f.vertices[0] as u32, f.vertices[1] as u32, f.vertices[2] as u32])
        .collect();

    Ok(MeshBuffers { vertices, indices })
}

fn export_stl(mesh: &MeshBuffers, path: &Path) -> Result<(), MeshIoError> {
    let triangles: Vec<_> = mesh
        .indices
        .iter()
        .map(|tri| {
            let [a, b, c] = [
                mesh.vertices[tri[0] as usize],
                mesh.vertices[tri[1] as usize],
                mesh.vertices[tri[2] as usize],
            ];
            let normal = (b - a)
                .cross(&(c - a))
                .try_normalize(1.0e-6)
                .unwrap_or_else(nalgebra::Vector3::zeros);

            stl_io::Triangle {
                normal: stl_io::Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [a, b, c].map(|v| stl_io::Vertex::new([v.x as f32, v.y as f32, v.z as f32])),
            }
        })
        .collect();

    let mut file = File::create(path)?;
    stl_io::write_stl(&mut file, triangles.iter())?;
    Ok(())
}
