//! Vertex welding.
//!
//! Vertices are bucketed by their quantized position, normal and uv, so
//! hard edges and uv seams keep separate copies of a shared position.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{RepairFailure, DEGENERATE_EPSILON};
use crate::Mesh;

/// Quantized position, normal and uv of a vertex.
///
/// Two vertices weld when every component rounds to the same multiple of
/// the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct WeldKey([i64; 8]);

impl WeldKey {
    fn of(mesh: &Mesh, i: usize, scale: f32) -> Self {
        let q = |x: f32| (x * scale).round() as i64;
        let p = mesh.positions[i];
        let n = mesh.normals[i];
        let uv = mesh.uvs.as_ref().map(|uvs| uvs[i]);
        Self([
            q(p.x),
            q(p.y),
            q(p.z),
            q(n.x),
            q(n.y),
            q(n.z),
            uv.map_or(0, |uv| q(uv.x)),
            uv.map_or(0, |uv| q(uv.y)),
        ])
    }
}

/// Merges vertices whose attributes agree within `tolerance`.
///
/// Welded vertices keep the attributes of their first occurrence in index
/// order and triangles that collapse onto fewer than three vertices are
/// dropped. Normals and bounds are recomputed afterwards.
///
/// Keys depend only on attribute values, so re-running the same merge on a
/// de-indexed copy gives the same answer. When merging leaves fewer than
/// three indices, the retry therefore re-merges the de-indexed copy at
/// [`DEGENERATE_EPSILON`], which keeps small triangles that a coarse
/// tolerance collapsed. If that fails too, `mesh` is returned unchanged.
pub fn weld_vertices(mesh: &Mesh, tolerance: f32) -> Mesh {
    match merge_vertices(mesh, tolerance) {
        Ok(welded) => welded,
        Err(first @ RepairFailure::TooFewIndices { .. }) if tolerance > DEGENERATE_EPSILON => {
            debug!(
                %first,
                retry_tolerance = DEGENERATE_EPSILON,
                "weld collapsed the mesh, retrying on de-indexed copy"
            );
            match merge_vertices(&mesh.to_non_indexed(), DEGENERATE_EPSILON) {
                Ok(welded) => welded,
                Err(second) => {
                    warn!(%second, "weld failed twice, keeping unwelded mesh");
                    mesh.clone()
                }
            }
        }
        Err(err) => {
            warn!(%err, "weld failed, keeping unwelded mesh");
            mesh.clone()
        }
    }
}

fn merge_vertices(mesh: &Mesh, tolerance: f32) -> Result<Mesh, RepairFailure> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(RepairFailure::BadTolerance(tolerance));
    }
    let scale = tolerance.recip();

    let mut lookup: HashMap<WeldKey, u32> = HashMap::new();
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = mesh.uvs.as_ref().map(|_| Vec::new());
    let mut indices = Vec::with_capacity(3 * mesh.triangle_count());

    for corners in mesh.triangle_indices() {
        let keys = corners.map(|i| WeldKey::of(mesh, i, scale));
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
            continue;
        }

        for (&i, key) in corners.iter().zip(keys) {
            let index = *lookup.entry(key).or_insert_with(|| {
                positions.push(mesh.positions[i]);
                normals.push(mesh.normals[i]);
                if let (Some(out), Some(src)) = (uvs.as_mut(), mesh.uvs.as_ref()) {
                    out.push(src[i]);
                }
                (positions.len() - 1) as u32
            });
            indices.push(index);
        }
    }

    if indices.len() < 3 {
        return Err(RepairFailure::TooFewIndices {
            indices: indices.len(),
        });
    }

    let mut welded = Mesh {
        positions,
        normals,
        uvs,
        indices: Some(indices),
        bounds: None,
    };
    welded.compute_vertex_normals();
    welded.compute_bounds();
    Ok(welded)
}
