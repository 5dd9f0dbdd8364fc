//! In-memory representation of an MJCF scene document.

pub use rewrite::{expand_geoms, rewrite_assets};

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use xmltree::{Element, EmitterConfig, XMLNode};

mod rewrite;

/// A fatal, document-level error. Per-mesh failures never surface here.
#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    /// Reading or writing the document file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not well-formed XML.
    #[error("malformed scene document: {0}")]
    Parse(#[from] xmltree::ParseError),
    /// The rewritten document could not be serialized.
    #[error("failed to serialize scene document: {0}")]
    Write(#[from] xmltree::Error),
}

/// An MJCF scene loaded from disk, rewritten in place on [`SceneDocument::save`].
pub struct SceneDocument {
    path: PathBuf,
    root: Element,
}

impl SceneDocument {
    /// Parses the scene file at `path`.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let file = File::open(path)?;
        let root = Element::parse(BufReader::new(file))?;
        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    /// Serializes the document back to the file it was loaded from.
    pub fn save(&self) -> Result<(), DocumentError> {
        let file = File::create(&self.path)?;
        let config = EmitterConfig::new().perform_indent(true);
        self.root.write_with_config(file, config)?;
        Ok(())
    }

    /// The document's root element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The directory mesh asset paths resolve against.
    ///
    /// The pipeline forces the compiler `meshdir` to `"."`, so this is
    /// always the directory containing the document itself.
    pub fn mesh_dir(&self) -> PathBuf {
        self.path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    }

    /// Forces the compiler `meshdir` to the document's own directory,
    /// creating the `compiler` element if it is absent.
    pub fn force_local_meshdir(&mut self) {
        let compiler = ensure_child(&mut self.root, "compiler");
        let _ = compiler
            .attributes
            .insert("meshdir".to_string(), ".".to_string());
    }

    /// Ensures the document has an `asset` element for the rewriter to
    /// target, creating an empty one if absent.
    pub fn ensure_asset_catalog(&mut self) {
        let _ = ensure_child(&mut self.root, "asset");
    }

    /// The mesh entries of the asset catalog, as a `name -> file` map.
    pub fn mesh_assets(&self) -> HashMap<String, String> {
        let mut assets = HashMap::new();

        if let Some(asset) = self.root.get_child("asset") {
            for mesh in child_elements(asset).filter(|e| e.name == "mesh") {
                if let (Some(name), Some(file)) =
                    (mesh.attributes.get("name"), mesh.attributes.get("file"))
                {
                    let _ = assets.insert(name.clone(), file.clone());
                }
            }
        }

        assets
    }

    /// Names of the meshes referenced by collision geoms, in document
    /// order, deduplicated.
    pub fn collision_mesh_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        collect_collision_meshes(&self.root, &mut names, &mut seen);
        names
    }
}

fn collect_collision_meshes(el: &Element, names: &mut Vec<String>, seen: &mut HashSet<String>) {
    if el.name == "body" {
        for geom in child_elements(el).filter(|e| is_collision_mesh_geom(e)) {
            if let Some(mesh) = geom.attributes.get("mesh") {
                if seen.insert(mesh.clone()) {
                    names.push(mesh.clone());
                }
            }
        }
    }

    for child in child_elements(el) {
        collect_collision_meshes(child, names, seen);
    }
}

/// A geom is a decomposition candidate when it is a mesh-typed collision
/// geom with an explicit mesh reference.
fn is_collision_mesh_geom(el: &Element) -> bool {
    el.name == "geom"
        && el.attributes.get("class").map(String::as_str) == Some("collision")
        && el.attributes.get("type").map(String::as_str) == Some("mesh")
        && el.attributes.contains_key("mesh")
}

fn child_elements(el: &Element) -> impl Iterator<Item = &Element> {
    el.children.iter().filter_map(|node| match node {
        XMLNode::Element(e) => Some(e),
        _ => None,
    })
}

fn ensure_child<'a>(root: &'a mut Element, name: &str) -> &'a mut Element {
    if root.get_child(name).is_none() {
        root.children.push(XMLNode::Element(Element::new(name)));
    }

    match root.get_mut_child(name) {
        Some(child) => child,
        None => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_doc(contents: &str) -> (tempfile::TempDir, SceneDocument) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.xml");
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, SceneDocument::load(&path).unwrap())
    }

    #[test]
    fn collision_meshes_are_collected_in_document_order() {
        let (_dir, doc) = write_doc(
            r#"<mujoco>
                <worldbody>
                  <body name="a">
                    <geom class="collision" type="mesh" mesh="m2"/>
                    <geom class="visual" type="mesh" mesh="skip_visual"/>
                    <body name="nested">
                      <geom class="collision" type="mesh" mesh="m1"/>
                      <geom class="collision" type="mesh" mesh="m2"/>
                    </body>
                  </body>
                  <body name="b">
                    <geom class="collision" type="box"/>
                    <geom class="collision" type="mesh" mesh="m3"/>
                  </body>
                </worldbody>
            </mujoco>"#,
        );

        assert_eq!(doc.collision_mesh_names(), vec!["m2", "m1", "m3"]);
    }

    #[test]
    fn meshdir_is_forced_and_compiler_created_when_absent() {
        let (_dir, mut doc) = write_doc("<mujoco><worldbody/></mujoco>");
        doc.force_local_meshdir();
        let compiler = doc.root().get_child("compiler").unwrap();
        assert_eq!(compiler.attributes.get("meshdir").unwrap(), ".");
    }

    #[test]
    fn meshdir_is_overwritten_when_present() {
        let (_dir, mut doc) =
            write_doc(r#"<mujoco><compiler meshdir="meshes" angle="radian"/></mujoco>"#);
        doc.force_local_meshdir();
        let compiler = doc.root().get_child("compiler").unwrap();
        assert_eq!(compiler.attributes.get("meshdir").unwrap(), ".");
        assert_eq!(compiler.attributes.get("angle").unwrap(), "radian");
    }

    #[test]
    fn mesh_assets_are_keyed_by_name() {
        let (_dir, doc) = write_doc(
            r#"<mujoco>
                <asset>
                  <mesh name="a" file="meshes/a.stl"/>
                  <mesh name="b" file="b.obj"/>
                  <texture name="not_a_mesh"/>
                </asset>
            </mujoco>"#,
        );

        let assets = doc.mesh_assets();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets["a"], "meshes/a.stl");
        assert_eq!(assets["b"], "b.obj");
    }
}
