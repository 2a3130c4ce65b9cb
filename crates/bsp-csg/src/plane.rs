//! Plane representation and point classification for BSP clipping.

use nalgebra::{Point3, Vector3};

/// Default epsilon for plane classification.
/// Points within this distance of the plane are considered "on" the plane.
pub const PLANE_EPSILON: f32 = 1e-5;

/// Which side of a plane a point lies on.
///
/// The discriminants are bit flags: OR-ing the sides of every vertex of a
/// polygon yields its [`Classification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PlaneSide {
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane = 0,
    /// Point is in front of the plane (positive side of normal)
    Front = 1,
    /// Point is behind the plane (negative side of normal)
    Back = 2,
}

impl PlaneSide {
    /// Returns the bit this side contributes to a polygon type mask.
    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Classification of a polygon relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// All vertices lie on the plane
    Coplanar,
    /// No vertex is behind the plane, at least one is in front
    Front,
    /// No vertex is in front of the plane, at least one is behind
    Back,
    /// Vertices are on both sides (spans the plane)
    Spanning,
}

impl Classification {
    /// Decodes an OR-ed mask of [`PlaneSide`] bits.
    #[inline]
    pub fn from_mask(mask: u8) -> Self {
        match mask & 0b11 {
            0 => Self::Coplanar,
            1 => Self::Front,
            2 => Self::Back,
            _ => Self::Spanning,
        }
    }
}

/// A plane in 3D space, represented as `normal · point = offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f32>,
    offset: f32,
}

impl Plane3D {
    /// Creates a plane from a normal vector and offset.
    /// The normal is normalized; returns `None` if it has zero length.
    pub fn new(normal: Vector3<f32>, offset: f32) -> Option<Self> {
        let norm = normal.norm();
        if norm <= f32::EPSILON {
            return None;
        }
        Some(Self {
            normal: normal / norm,
            offset: offset / norm,
        })
    }

    /// Creates a plane from a point on the plane and a normal vector.
    /// Returns `None` if the normal has zero length.
    pub fn from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Option<Self> {
        let norm = normal.norm();
        if norm <= f32::EPSILON {
            return None;
        }
        let unit_normal = normal / norm;
        let offset = unit_normal.dot(&point.coords);
        Some(Self {
            normal: unit_normal,
            offset,
        })
    }

    /// Creates a plane from three points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    ///
    /// Returns `None` when the points are collinear (or nearly so).
    pub fn from_three_points(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Option<Self> {
        let ab = b - a;
        let ac = c - a;
        Self::from_point_and_normal(a, ab.cross(&ac))
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind (opposite side from normal)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, point: &Point3<f32>) -> f32 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Classifies which side of the plane a point lies on.
    /// Uses the default `PLANE_EPSILON` tolerance.
    #[inline]
    pub fn classify_point(&self, point: &Point3<f32>) -> PlaneSide {
        self.classify_point_with_epsilon(point, PLANE_EPSILON)
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: &Point3<f32>, epsilon: f32) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Flips the plane in place.
    #[inline]
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.offset = -self.offset;
    }

    /// Parameter `t` along `start -> end` where the segment meets the plane.
    ///
    /// Not clamped to `[0, 1]`; callers only ask for segments whose endpoints
    /// lie on opposite sides. Returns `None` for segments parallel to the plane.
    #[inline]
    pub fn segment_parameter(&self, start: &Point3<f32>, end: &Point3<f32>) -> Option<f32> {
        let denom = self.normal.dot(&(end - start));
        if denom == 0.0 {
            return None;
        }
        Some((self.offset - self.normal.dot(&start.coords)) / denom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn from_three_points_is_unit_and_right_handed() {
        let plane = Plane3D::from_three_points(
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(3.0, 0.0, 2.0),
            Point3::new(0.0, 5.0, 2.0),
        )
        .unwrap();

        assert_relative_eq!(plane.normal().norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(plane.normal(), Vector3::z(), epsilon = 1e-6);
        assert_relative_eq!(plane.offset(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn collinear_points_have_no_plane() {
        let plane = Plane3D::from_three_points(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        );
        assert!(plane.is_none());
        assert!(Plane3D::new(Vector3::zeros(), 1.0).is_none());
    }

    #[test]
    fn classify_respects_epsilon() {
        let plane = Plane3D::new(Vector3::y(), 0.0).unwrap();

        assert_eq!(plane.classify_point(&Point3::new(0.0, 1.0, 0.0)), PlaneSide::Front);
        assert_eq!(plane.classify_point(&Point3::new(0.0, -1.0, 0.0)), PlaneSide::Back);
        assert_eq!(plane.classify_point(&Point3::new(4.0, 5e-6, 0.0)), PlaneSide::OnPlane);
        assert_eq!(plane.classify_point(&Point3::new(4.0, -5e-6, 0.0)), PlaneSide::OnPlane);
        assert_eq!(plane.classify_point(&Point3::new(0.0, 2e-5, 0.0)), PlaneSide::Front);
    }

    #[test]
    fn mask_decoding() {
        let mask = PlaneSide::Front.bits() | PlaneSide::OnPlane.bits();
        assert_eq!(Classification::from_mask(mask), Classification::Front);
        let mask = PlaneSide::Front.bits() | PlaneSide::Back.bits();
        assert_eq!(Classification::from_mask(mask), Classification::Spanning);
        assert_eq!(Classification::from_mask(0), Classification::Coplanar);
        assert_eq!(Classification::from_mask(PlaneSide::Back.bits()), Classification::Back);
    }

    #[test]
    fn flip_twice_is_identity() {
        let plane = Plane3D::new(Vector3::new(1.0, 2.0, 3.0), 4.0).unwrap();
        let mut flipped = plane.flipped();
        assert_eq!(flipped.normal(), -plane.normal());
        assert_eq!(flipped.offset(), -plane.offset());
        flipped.flip();
        assert_eq!(flipped, plane);
    }

    #[test]
    fn segment_parameter_hits_plane() {
        let plane = Plane3D::new(Vector3::x(), 0.5).unwrap();
        let t = plane
            .segment_parameter(&Point3::new(0.0, 0.0, 0.0), &Point3::new(2.0, 1.0, 0.0))
            .unwrap();
        assert_relative_eq!(t, 0.25);

        let parallel =
            plane.segment_parameter(&Point3::new(0.0, 0.0, 0.0), &Point3::new(0.0, 1.0, 0.0));
        assert!(parallel.is_none());
    }
}
