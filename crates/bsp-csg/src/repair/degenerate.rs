//! Sliver removal, the first repair stage.

use nalgebra::Point3;

use super::RepairFailure;
use crate::Mesh;

/// De-indexes `mesh` and drops every triangle with two corners within
/// `epsilon` of each other.
///
/// Fails when nothing survives; the caller then keeps the input.
pub(crate) fn remove_degenerate(mesh: &Mesh, epsilon: f32) -> Result<Mesh, RepairFailure> {
    let flat = mesh.to_non_indexed();
    let limit = epsilon * epsilon;
    let collapsed = |a: &Point3<f32>, b: &Point3<f32>| (a - b).norm_squared() <= limit;

    let kept: Vec<usize> = flat
        .triangles()
        .enumerate()
        .filter(|(_, [a, b, c])| !(collapsed(a, b) || collapsed(b, c) || collapsed(c, a)))
        .flat_map(|(t, _)| [3 * t, 3 * t + 1, 3 * t + 2])
        .collect();

    if kept.is_empty() {
        return Err(RepairFailure::TooFewIndices { indices: 0 });
    }

    let mut cleaned = Mesh {
        positions: kept.iter().map(|&i| flat.positions[i]).collect(),
        normals: kept.iter().map(|&i| flat.normals[i]).collect(),
        uvs: flat
            .uvs
            .as_ref()
            .map(|uvs| kept.iter().map(|&i| uvs[i]).collect()),
        indices: None,
        bounds: None,
    };
    cleaned.compute_bounds();
    Ok(cleaned)
}
