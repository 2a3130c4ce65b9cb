//! Conversion between triangle meshes and world-space polygon soups.

use nalgebra::{Matrix4, Point2};
use tracing::debug;

use crate::error::{CsgError, Result};
use crate::vertex::normal_matrix;
use crate::{Mesh, Polygon, SolidTag};

/// A polygon soup baked into world space, plus the transform that produced it.
#[derive(Debug, Clone)]
pub struct Solid {
    polygons: Vec<Polygon>,
    transform: Matrix4<f32>,
}

impl Solid {
    /// Converts every triangle of `mesh` into a three-vertex polygon.
    ///
    /// Positions go through `world`, normals through its inverse-transpose;
    /// uvs are copied. Triangles are read through the index buffer when
    /// there is one, otherwise as consecutive triples.
    pub fn from_mesh(mesh: &Mesh, world: &Matrix4<f32>, tag: SolidTag) -> Result<Self> {
        mesh.validate()?;
        let normals = normal_matrix(world).ok_or(CsgError::SingularTransform)?;

        let polygons: Vec<Polygon> = mesh
            .triangle_indices()
            .map(|corners| {
                let vertices = corners
                    .iter()
                    .map(|&i| mesh.vertex(i).transformed(world, &normals))
                    .collect();
                Polygon::new(vertices, tag)
            })
            .collect();

        debug!(?tag, polygons = polygons.len(), "mesh converted to solid");

        Ok(Self {
            polygons,
            transform: *world,
        })
    }

    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    #[inline]
    pub fn transform(&self) -> &Matrix4<f32> {
        &self.transform
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        self.polygons
    }
}

/// Converts `mesh` into world-space triangle polygons tagged with `tag`.
pub fn mesh_to_polygons(mesh: &Mesh, world: &Matrix4<f32>, tag: SolidTag) -> Result<Vec<Polygon>> {
    Solid::from_mesh(mesh, world, tag).map(Solid::into_polygons)
}

/// Fan-triangulates every polygon from its first vertex into a non-indexed mesh.
///
/// Exact for convex polygons, which is what splitting triangles produces.
/// A uv buffer is emitted when any vertex carries uvs; vertices without one
/// get `(0, 0)`.
pub fn polygons_to_mesh(polygons: &[Polygon]) -> Mesh {
    let corner_count: usize = polygons.iter().map(|p| 3 * p.len().saturating_sub(2)).sum();
    let has_uvs = polygons
        .iter()
        .any(|p| p.vertices().iter().any(|v| v.uv.is_some()));

    let mut positions = Vec::with_capacity(corner_count);
    let mut normals = Vec::with_capacity(corner_count);
    let mut uvs = Vec::with_capacity(if has_uvs { corner_count } else { 0 });

    for polygon in polygons {
        let verts = polygon.vertices();
        for i in 1..verts.len().saturating_sub(1) {
            for v in [&verts[0], &verts[i], &verts[i + 1]] {
                positions.push(v.pos);
                normals.push(v.normal);
                if has_uvs {
                    uvs.push(v.uv.unwrap_or_else(Point2::origin));
                }
            }
        }
    }

    let mut mesh = Mesh::new(positions, normals);
    if has_uvs {
        mesh = mesh.with_uvs(uvs);
    }
    mesh.compute_bounds();
    mesh
}
