//! Polygon vertices carrying position, shading normal and optional texture coordinates.

use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector3};

/// A polygon vertex.
///
/// Vertices are plain values: they are copied when a polygon passes through a
/// split unchanged and created fresh only by [`Vertex::interpolate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Point3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Option<Point2<f32>>,
}

impl Vertex {
    /// Creates a vertex without texture coordinates.
    pub fn new(pos: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self {
            pos,
            normal,
            uv: None,
        }
    }

    /// Creates a vertex with texture coordinates.
    pub fn with_uv(pos: Point3<f32>, normal: Vector3<f32>, uv: Point2<f32>) -> Self {
        Self {
            pos,
            normal,
            uv: Some(uv),
        }
    }

    /// Negates the normal.
    #[inline]
    pub fn flip(&mut self) {
        self.normal = -self.normal;
    }

    /// Linear interpolation between `self` (`t = 0`) and `other` (`t = 1`).
    ///
    /// The interpolated normal is renormalized. Texture coordinates are only
    /// interpolated when both ends carry them; otherwise whichever end has
    /// them is kept.
    pub fn interpolate(&self, other: &Vertex, t: f32) -> Vertex {
        let pos = self.pos + (other.pos - self.pos) * t;

        let normal = self.normal + (other.normal - self.normal) * t;
        let normal = normal.try_normalize(f32::EPSILON).unwrap_or(self.normal);

        let uv = match (self.uv, other.uv) {
            (Some(a), Some(b)) => Some(a + (b - a) * t),
            (a, b) => a.or(b),
        };

        Vertex { pos, normal, uv }
    }

    /// Returns a copy moved by `matrix`, with the normal taken through
    /// `normal_matrix` (the inverse-transpose of the linear part) and renormalized.
    pub fn transformed(&self, matrix: &Matrix4<f32>, normal_matrix: &Matrix3<f32>) -> Vertex {
        let normal = normal_matrix * self.normal;
        Vertex {
            pos: matrix.transform_point(&self.pos),
            normal: normal.try_normalize(f32::EPSILON).unwrap_or(normal),
            uv: self.uv,
        }
    }
}

/// Inverse-transpose of the upper-left 3x3 block of `matrix`.
///
/// Returns `None` when the linear part is singular.
pub fn normal_matrix(matrix: &Matrix4<f32>) -> Option<Matrix3<f32>> {
    let linear: Matrix3<f32> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    linear.try_inverse().map(|inv| inv.transpose())
}
