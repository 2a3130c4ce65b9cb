//! Triangle mesh buffers exchanged with the scene.

use nalgebra::{Matrix4, Point2, Point3, Vector3};

use crate::error::{CsgError, Result};
use crate::vertex::normal_matrix;
use crate::Vertex;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    /// Smallest box containing every point; `None` for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f32>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self { min: first, max: first }, |aabb, p| Self {
            min: aabb.min.inf(p),
            max: aabb.max.sup(p),
        }))
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn extents(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// A triangle mesh in flat attribute buffers.
///
/// Without `indices`, every three consecutive vertices form a triangle.
/// `normals` and `uvs` (when present) run parallel to `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Point3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub uvs: Option<Vec<Point2<f32>>>,
    pub indices: Option<Vec<u32>>,
    /// Cached bounds, refreshed by [`Mesh::compute_bounds`].
    pub bounds: Option<Aabb>,
}

impl Mesh {
    /// Creates a non-indexed mesh without texture coordinates.
    pub fn new(positions: Vec<Point3<f32>>, normals: Vec<Vector3<f32>>) -> Self {
        Self {
            positions,
            normals,
            ..Self::default()
        }
    }

    /// Attaches texture coordinates.
    pub fn with_uvs(mut self, uvs: Vec<Point2<f32>>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// Attaches an index buffer.
    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Checks buffer lengths and index ranges.
    pub fn validate(&self) -> Result<()> {
        let count = self.positions.len();
        if self.normals.len() != count {
            return Err(CsgError::InvalidMesh(format!(
                "{} normals for {count} positions",
                self.normals.len()
            )));
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != count {
                return Err(CsgError::InvalidMesh(format!(
                    "{} uvs for {count} positions",
                    uvs.len()
                )));
            }
        }
        match &self.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(CsgError::InvalidMesh(format!(
                        "index count {} is not a multiple of 3",
                        indices.len()
                    )));
                }
                if let Some(&bad) = indices.iter().find(|&&i| i as usize >= count) {
                    return Err(CsgError::InvalidMesh(format!(
                        "index {bad} out of range for {count} vertices"
                    )));
                }
            }
            None if count % 3 != 0 => {
                return Err(CsgError::InvalidMesh(format!(
                    "vertex count {count} is not a multiple of 3"
                )));
            }
            None => {}
        }
        Ok(())
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Vertex indices of each triangle, through the index buffer if present.
    pub fn triangle_indices(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let count = self.triangle_count();
        (0..count).map(move |t| match &self.indices {
            Some(indices) => [
                indices[3 * t] as usize,
                indices[3 * t + 1] as usize,
                indices[3 * t + 2] as usize,
            ],
            None => [3 * t, 3 * t + 1, 3 * t + 2],
        })
    }

    /// Positions of each triangle's corners.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        self.triangle_indices()
            .map(|[a, b, c]| [self.positions[a], self.positions[b], self.positions[c]])
    }

    /// Gathers the attributes of vertex `i`.
    pub fn vertex(&self, i: usize) -> Vertex {
        Vertex {
            pos: self.positions[i],
            normal: self.normals[i],
            uv: self.uvs.as_ref().map(|uvs| uvs[i]),
        }
    }

    /// Expands the index buffer so every triangle owns its three vertices.
    pub fn to_non_indexed(&self) -> Mesh {
        if self.indices.is_none() {
            return self.clone();
        }
        let corners: Vec<usize> = self.triangle_indices().flatten().collect();
        Mesh {
            positions: corners.iter().map(|&i| self.positions[i]).collect(),
            normals: corners.iter().map(|&i| self.normals[i]).collect(),
            uvs: self
                .uvs
                .as_ref()
                .map(|uvs| corners.iter().map(|&i| uvs[i]).collect()),
            indices: None,
            bounds: self.bounds,
        }
    }

    /// Recomputes vertex normals as the area-weighted average of the face
    /// normals of every triangle that references the vertex.
    ///
    /// Vertices without a non-degenerate triangle keep their normal.
    pub fn compute_vertex_normals(&mut self) {
        let mut sums = vec![Vector3::zeros(); self.positions.len()];

        for [a, b, c] in self.triangle_indices() {
            let (pa, pb, pc) = (self.positions[a], self.positions[b], self.positions[c]);
            // Unnormalized cross product: its length is twice the area.
            let face = (pb - pa).cross(&(pc - pa));
            sums[a] += face;
            sums[b] += face;
            sums[c] += face;
        }

        for (normal, sum) in self.normals.iter_mut().zip(sums) {
            if let Some(unit) = sum.try_normalize(1e-12) {
                *normal = unit;
            }
        }
    }

    /// Moves positions by `matrix` and normals by its inverse-transpose.
    pub fn transform(&mut self, matrix: &Matrix4<f32>) -> Result<()> {
        let normal_matrix = normal_matrix(matrix).ok_or(CsgError::SingularTransform)?;
        for p in &mut self.positions {
            *p = matrix.transform_point(p);
        }
        for n in &mut self.normals {
            let moved = normal_matrix * *n;
            *n = moved.try_normalize(f32::EPSILON).unwrap_or(moved);
        }
        if self.bounds.is_some() {
            self.compute_bounds();
        }
        Ok(())
    }

    /// Refreshes the cached bounding box.
    pub fn compute_bounds(&mut self) {
        self.bounds = Aabb::from_points(&self.positions);
    }

    /// Signed enclosed volume (divergence theorem); positive for a closed,
    /// outward-facing mesh.
    pub fn signed_volume(&self) -> f32 {
        self.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)))
            .sum::<f32>()
            / 6.0
    }
}
