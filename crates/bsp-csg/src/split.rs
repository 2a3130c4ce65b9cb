//! Splitting polygons by a single plane.

use crate::{Classification, Plane3D, PlaneSide, Polygon};

/// The four destination lists of a plane split.
#[derive(Debug, Default)]
pub struct Partition {
    /// Coplanar polygons facing the same way as the plane normal.
    pub coplanar_front: Vec<Polygon>,
    /// Coplanar polygons facing against the plane normal.
    pub coplanar_back: Vec<Polygon>,
    /// Polygons (or fragments) in front of the plane.
    pub front: Vec<Polygon>,
    /// Polygons (or fragments) behind the plane.
    pub back: Vec<Polygon>,
}

impl Partition {
    /// Splits every polygon against `plane`.
    pub fn of(plane: &Plane3D, polygons: impl IntoIterator<Item = Polygon>) -> Self {
        let mut partition = Self::default();
        for polygon in polygons {
            partition.push(plane, polygon);
        }
        partition
    }

    /// Routes a single polygon into the matching list(s).
    ///
    /// # Routing by classification
    ///
    /// - **Coplanar**: `coplanar_front` if the polygon's facing normal points
    ///   along the plane normal, else `coplanar_back`
    /// - **Front** / **Back**: moved unmodified into `front` / `back`
    /// - **Spanning**: cut in two; each half is kept only if it has at least
    ///   three vertices
    pub fn push(&mut self, plane: &Plane3D, polygon: Polygon) {
        match polygon.classify(plane) {
            Classification::Coplanar => {
                if plane.normal().dot(&polygon.facing_normal()) > 0.0 {
                    self.coplanar_front.push(polygon);
                } else {
                    self.coplanar_back.push(polygon);
                }
            }
            Classification::Front => self.front.push(polygon),
            Classification::Back => self.back.push(polygon),
            Classification::Spanning => {
                let (front, back) = split_spanning(&polygon, plane);
                self.front.extend(front);
                self.back.extend(back);
            }
        }
    }

    /// Total number of polygons across all four lists.
    pub fn len(&self) -> usize {
        self.coplanar_front.len() + self.coplanar_back.len() + self.front.len() + self.back.len()
    }

    /// Returns true if every list is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits a spanning polygon into front and back parts.
///
/// Walks the polygon edges and builds two vertex lists. On-plane vertices are
/// shared by both lists; each edge that crosses from front to back (or back to
/// front) contributes one interpolated vertex, the same value on both sides.
fn split_spanning(polygon: &Polygon, plane: &Plane3D) -> (Option<Polygon>, Option<Polygon>) {
    let vertices = polygon.vertices();
    let n = vertices.len();

    let mut front_verts = Vec::with_capacity(n + 1);
    let mut back_verts = Vec::with_capacity(n + 1);

    let sides: Vec<PlaneSide> = vertices
        .iter()
        .map(|v| plane.classify_point(&v.pos))
        .collect();

    for i in 0..n {
        let j = (i + 1) % n;
        let (vi, ti) = (&vertices[i], sides[i]);
        let (vj, tj) = (&vertices[j], sides[j]);

        if ti != PlaneSide::Back {
            front_verts.push(vi.clone());
        }
        if ti != PlaneSide::Front {
            back_verts.push(vi.clone());
        }

        if Classification::from_mask(ti.bits() | tj.bits()) == Classification::Spanning {
            if let Some(t) = plane.segment_parameter(&vi.pos, &vj.pos) {
                let shared = vi.interpolate(vj, t);
                front_verts.push(shared.clone());
                back_verts.push(shared);
            }
        }
    }

    let front = (front_verts.len() >= 3).then(|| Polygon::new(front_verts, polygon.tag()));
    let back = (back_verts.len() >= 3).then(|| Polygon::new(back_verts, polygon.tag()));

    (front, back)
}
