//! Rewriting of the asset catalog and body geometries after decomposition.
//!
//! Both passes rebuild the relevant child lists from a snapshot instead of
//! removing nodes mid-iteration. A decomposed entry's replacements take the
//! position of the original node, so the sibling order of everything else
//! is preserved exactly.

use super::{is_collision_mesh_geom, SceneDocument};
use crate::pipeline::PartMesh;
use std::collections::HashMap;
use std::mem;
use xmltree::{Element, XMLNode};

/// Replaces the asset-catalog entry of every decomposed mesh by one entry
/// per convex part. Meshes absent from `parts` are left untouched.
pub fn rewrite_assets(doc: &mut SceneDocument, parts: &HashMap<String, Vec<PartMesh>>) {
    let Some(asset) = doc.root.get_mut_child("asset") else {
        return;
    };

    let snapshot = mem::take(&mut asset.children);
    for node in snapshot {
        if let XMLNode::Element(mesh) = &node {
            if mesh.name == "mesh" {
                if let Some(part_list) = mesh.attributes.get("name").and_then(|n| parts.get(n)) {
                    for part in part_list {
                        let mut entry = Element::new("mesh");
                        let _ = entry.attributes.insert("name".to_string(), part.name.clone());
                        let _ = entry.attributes.insert("file".to_string(), part.file.clone());
                        asset.children.push(XMLNode::Element(entry));
                    }
                    continue;
                }
            }
        }

        asset.children.push(node);
    }
}

/// Replaces every collision geom referencing a decomposed mesh by one geom
/// per convex part, copying all other attributes of the original. Geoms
/// referencing meshes absent from `parts` are left untouched.
pub fn expand_geoms(doc: &mut SceneDocument, parts: &HashMap<String, Vec<PartMesh>>) {
    expand_body_geoms(&mut doc.root, parts);
}

fn expand_body_geoms(el: &mut Element, parts: &HashMap<String, Vec<PartMesh>>) {
    if el.name == "body" {
        let snapshot = mem::take(&mut el.children);
        for node in snapshot {
            if let XMLNode::Element(geom) = &node {
                if is_collision_mesh_geom(geom) {
                    if let Some((mesh_name, part_list)) = geom
                        .attributes
                        .get("mesh")
                        .and_then(|m| parts.get_key_value(m))
                    {
                        for part in part_list {
                            let expanded = expanded_geom(geom, mesh_name, part);
                            el.children.push(XMLNode::Element(expanded));
                        }
                        continue;
                    }
                }
            }

            el.children.push(node);
        }
    }

    for node in el.children.iter_mut() {
        if let XMLNode::Element(child) = node {
            expand_body_geoms(child, parts);
        }
    }
}

/// Builds one replacement geom: every attribute of the original except
/// `mesh` and `name` is copied in order, then the new name and mesh
/// reference are appended.
fn expanded_geom(original: &Element, mesh_name: &str, part: &PartMesh) -> Element {
    let mut geom = Element::new("geom");

    for (key, value) in &original.attributes {
        if key != "mesh" && key != "name" {
            let _ = geom.attributes.insert(key.clone(), value.clone());
        }
    }

    let base = original
        .attributes
        .get("name")
        .cloned()
        .unwrap_or_else(|| format!("{mesh_name}_collision"));
    let _ = geom
        .attributes
        .insert("name".to_string(), format!("{base}_{}", part.name));
    let _ = geom.attributes.insert("mesh".to_string(), part.name.clone());

    geom
}
