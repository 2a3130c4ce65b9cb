//! Generic polygon representation for BSP clipping.

use nalgebra::{Point3, Vector3};

use crate::{Classification, Plane3D, Vertex};

/// Opaque provenance tag identifying which solid a polygon came from.
///
/// The tag travels through every split and flip but never reaches output
/// mesh buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SolidTag(pub u32);

impl SolidTag {
    /// Tag given to the solid being cut.
    pub const TARGET: Self = Self(0);
    /// Tag given to the cutting solid.
    pub const TOOL: Self = Self(1);
}

/// A planar polygon in 3D space, defined by an ordered list of vertices.
///
/// Vertices should be (approximately) coplanar and in counter-clockwise
/// winding order when viewed from the front. Repeated splitting degrades
/// coplanarity slightly; nothing here relies on it being exact.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vertex>,
    tag: SolidTag,
}

impl Polygon {
    /// Creates a new polygon from a list of vertices.
    ///
    /// # Panics (debug builds only)
    /// Panics if fewer than 3 vertices are provided.
    pub fn new(vertices: Vec<Vertex>, tag: SolidTag) -> Self {
        debug_assert!(
            vertices.len() >= 3,
            "Polygon must have at least 3 vertices"
        );
        Self { vertices, tag }
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Returns the provenance tag.
    #[inline]
    pub fn tag(&self) -> SolidTag {
        self.tag
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the polygon has no vertices (always false for valid polygons).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the plane through the first three vertices.
    ///
    /// `None` when the leading triangle has (near) zero area.
    pub fn plane(&self) -> Option<Plane3D> {
        match self.vertices.as_slice() {
            [a, b, c, ..] => Plane3D::from_three_points(a.pos, b.pos, c.pos),
            _ => None,
        }
    }

    /// Normal used to decide coplanar facing: the first vertex's normal.
    #[inline]
    pub fn facing_normal(&self) -> Vector3<f32> {
        self.vertices
            .first()
            .map_or_else(Vector3::zeros, |v| v.normal)
    }

    /// Computes the centroid (vertex average) of the polygon.
    pub fn centroid(&self) -> Point3<f32> {
        let sum: Vector3<f32> = self.vertices.iter().map(|v| v.pos.coords).sum();
        Point3::from(sum / self.vertices.len() as f32)
    }

    /// Reverses the winding and negates every vertex normal.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for vertex in &mut self.vertices {
            vertex.flip();
        }
    }

    /// Classifies this polygon relative to a plane by OR-ing vertex sides.
    pub fn classify(&self, plane: &Plane3D) -> Classification {
        let mask = self
            .vertices
            .iter()
            .fold(0u8, |mask, v| mask | plane.classify_point(&v.pos).bits());
        Classification::from_mask(mask)
    }
}
