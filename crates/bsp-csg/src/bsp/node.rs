//! BSP tree node implementation.

use std::mem;

use tracing::debug;

use crate::split::Partition;
use crate::{Plane3D, Polygon};

/// A node in the BSP tree.
///
/// Each node partitions space using a splitting plane and stores the
/// polygons lying on that plane. Polygons in front of or behind the plane
/// live in the respective child subtrees.
///
/// A node starts out empty (no plane). The first [`build`](Self::build) call
/// fixes its plane; later calls only add to the existing partition. The
/// state is implied by which fields are populated:
///
/// - **Empty**: no plane, no polygons, no children
/// - **Built**: a plane, the coplanar polygons, and a child wherever
///   polygons were routed during build
///
/// [`invert`](Self::invert) and [`clip_to`](Self::clip_to) then mutate a
/// built node in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BspNode {
    /// The splitting plane, `None` until the first non-empty build.
    plane: Option<Plane3D>,

    /// Polygons coplanar with the plane, both facings.
    polygons: Vec<Polygon>,

    /// Subtree for the half-space in FRONT of the splitting plane.
    front: Option<Box<BspNode>>,

    /// Subtree for the half-space BEHIND the splitting plane.
    back: Option<Box<BspNode>>,
}

impl BspNode {
    /// Creates an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the splitting plane, if the node has been built.
    #[inline]
    pub fn plane(&self) -> Option<&Plane3D> {
        self.plane.as_ref()
    }

    /// Returns the polygons stored at this node.
    #[inline]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Returns a reference to the front child subtree.
    #[inline]
    pub fn front(&self) -> Option<&BspNode> {
        self.front.as_deref()
    }

    /// Returns a reference to the back child subtree.
    #[inline]
    pub fn back(&self) -> Option<&BspNode> {
        self.back.as_deref()
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    /// Inserts polygons into the partition rooted at this node.
    ///
    /// An empty node takes its plane from the first polygon whose leading
    /// triangle is non-degenerate and keeps that polygon without classifying
    /// it, so every new node consumes at least one polygon. Coplanar polygons
    /// (either facing) stay at this node; front and back parts create
    /// children on demand and recurse.
    pub fn build(&mut self, mut polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }

        if self.plane.is_none() {
            let Some((index, plane)) = polygons
                .iter()
                .enumerate()
                .find_map(|(i, p)| p.plane().map(|plane| (i, plane)))
            else {
                debug!(
                    dropped = polygons.len(),
                    "no polygon in batch defines a plane, dropping slivers"
                );
                return;
            };
            // a slightly non-planar splitter can classify off its own plane
            self.polygons.push(polygons.remove(index));
            self.plane = Some(plane);
        }
        let Some(plane) = &self.plane else {
            return;
        };

        let Partition {
            coplanar_front,
            coplanar_back,
            front,
            back,
        } = Partition::of(plane, polygons);

        self.polygons.extend(coplanar_front);
        self.polygons.extend(coplanar_back);

        if !front.is_empty() {
            self.front.get_or_insert_with(Box::default).build(front);
        }
        if !back.is_empty() {
            self.back.get_or_insert_with(Box::default).build(back);
        }
    }

    /// Removes the parts of `polygons` that lie inside the solid this subtree
    /// describes.
    ///
    /// Front-side fragments (including coplanar ones facing along the plane)
    /// descend into the front child, or survive when there is none. Back-side
    /// fragments descend into the back child, or are discarded when there is
    /// none.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons;
        };

        let Partition {
            coplanar_front,
            coplanar_back,
            front,
            back,
        } = Partition::of(plane, polygons);

        let mut front_side = coplanar_front;
        front_side.extend(front);
        let mut back_side = coplanar_back;
        back_side.extend(back);

        let mut kept = match &self.front {
            Some(node) => node.clip_polygons(front_side),
            None => front_side,
        };
        if let Some(node) = &self.back {
            kept.extend(node.clip_polygons(back_side));
        }
        kept
    }

    /// Clips the polygons of every node in this subtree against `other`.
    pub fn clip_to(&mut self, other: &BspNode) {
        self.polygons = other.clip_polygons(mem::take(&mut self.polygons));
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    /// Turns the described solid inside out.
    ///
    /// Flips every polygon and plane, then swaps the children. No vertex
    /// moves.
    pub fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        mem::swap(&mut self.front, &mut self.back);
    }

    /// Copies out every polygon in the subtree: own, then front's, then back's.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = Vec::with_capacity(self.polygon_count());
        self.collect_into(&mut result);
        result
    }

    /// Consumes the subtree, yielding polygons in the same order as
    /// [`all_polygons`](Self::all_polygons).
    pub fn into_polygons(self) -> Vec<Polygon> {
        let mut result = Vec::with_capacity(self.polygon_count());
        self.drain_into(&mut result);
        result
    }

    /// Returns the total number of polygons in this subtree (including all descendants).
    pub fn polygon_count(&self) -> usize {
        let mut count = self.polygons.len();

        if let Some(ref front) = self.front {
            count += front.polygon_count();
        }
        if let Some(ref back) = self.back {
            count += back.polygon_count();
        }

        count
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        let front_depth = self.front.as_ref().map_or(0, |n| n.depth());
        let back_depth = self.back.as_ref().map_or(0, |n| n.depth());
        1 + front_depth.max(back_depth)
    }

    fn collect_into(&self, result: &mut Vec<Polygon>) {
        result.extend(self.polygons.iter().cloned());
        if let Some(front) = &self.front {
            front.collect_into(result);
        }
        if let Some(back) = &self.back {
            back.collect_into(result);
        }
    }

    fn drain_into(self, result: &mut Vec<Polygon>) {
        result.extend(self.polygons);
        if let Some(front) = self.front {
            front.drain_into(result);
        }
        if let Some(back) = self.back {
            back.drain_into(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Classification, SolidTag, Vertex};
    use nalgebra::{Point3, Vector3};

    fn make_triangle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Polygon {
        let (a, b, c) = (Point3::from(a), Point3::from(b), Point3::from(c));
        let normal = (b - a).cross(&(c - a)).normalize();
        Polygon::new(
            vec![
                Vertex::new(a, normal),
                Vertex::new(b, normal),
                Vertex::new(c, normal),
            ],
            SolidTag(0),
        )
    }

    #[test]
    fn new_node_is_empty_leaf() {
        let node = BspNode::new();

        assert!(node.plane().is_none());
        assert!(node.is_leaf());
        assert_eq!(node.polygon_count(), 0);
        assert_eq!(node.depth(), 1);
    }

    #[test]
    fn build_takes_plane_from_first_polygon() {
        let mut node = BspNode::new();
        node.build(vec![
            make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]),
        ]);

        let plane = node.plane().unwrap();
        assert_eq!(plane.normal(), Vector3::z());
        assert_eq!(node.polygons().len(), 1);
        assert!(node.front().is_some());
        assert!(node.back().is_none());
        assert_eq!(node.polygon_count(), 2);
        assert_eq!(node.depth(), 2);
    }

    #[test]
    fn build_skips_degenerate_leading_polygons_for_plane() {
        let sliver = make_triangle([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]);
        let tri = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);

        let mut node = BspNode::new();
        node.build(vec![sliver, tri]);
        assert_eq!(node.plane().unwrap().normal(), Vector3::z());
    }

    /// A quad whose last corner sits `lift` above the plane of the first three.
    fn make_warped_quad(z: f32, lift: f32) -> Polygon {
        let corners = [
            [0.0, 0.0, z],
            [1.0, 0.0, z],
            [1.0, 1.0, z],
            [0.0, 1.0, z + lift],
        ];
        Polygon::new(
            corners
                .iter()
                .map(|&c| Vertex::new(Point3::from(c), Vector3::z()))
                .collect(),
            SolidTag(0),
        )
    }

    #[test]
    fn build_keeps_non_planar_splitter_at_node() {
        let warped = make_warped_quad(0.0, 3e-5);
        let plane = warped.plane().unwrap();
        assert_eq!(warped.classify(&plane), Classification::Front);

        let mut node = BspNode::new();
        node.build(vec![warped.clone()]);

        assert_eq!(node.polygons(), &[warped][..]);
        assert!(node.is_leaf());
        assert_eq!(node.depth(), 1);
        assert_eq!(node.polygon_count(), 1);
    }

    #[test]
    fn non_planar_fragment_in_front_becomes_child_splitter() {
        let mut node = BspNode::new();
        node.build(vec![
            make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            make_warped_quad(1.0, 3e-5),
            make_warped_quad(2.0, -3e-5),
        ]);

        assert_eq!(node.depth(), 3);
        assert_eq!(node.polygon_count(), 3);
        let front = node.front().unwrap();
        assert_eq!(front.polygons().len(), 1);
        assert_eq!(front.polygons()[0].vertices().len(), 4);
    }

    #[test]
    fn build_is_additive() {
        let mut node = BspNode::new();
        node.build(vec![make_triangle(
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        )]);
        let plane = node.plane().cloned();

        node.build(vec![
            make_triangle([0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]),
            make_triangle([2.0, 0.0, 0.0], [3.0, 0.0, 0.0], [2.0, 1.0, 0.0]),
        ]);

        assert_eq!(node.plane().cloned(), plane);
        assert_eq!(node.polygons().len(), 2);
        assert!(node.back().is_some());
        assert_eq!(node.polygon_count(), 3);
    }

    #[test]
    fn clip_without_plane_returns_input() {
        let node = BspNode::new();
        let poly = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert_eq!(node.clip_polygons(vec![poly.clone()]), vec![poly]);
    }

    #[test]
    fn clip_keeps_front_and_discards_back_at_leaf() {
        let mut node = BspNode::new();
        node.build(vec![make_triangle(
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        )]);

        let above = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let below = make_triangle([0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]);
        let across = make_triangle([0.0, 0.0, -1.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]);

        let kept = node.clip_polygons(vec![above.clone(), below, across]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0], above);
        for v in kept[1].vertices() {
            assert!(v.pos.z >= -1e-5);
        }
    }

    #[test]
    fn clip_routes_coplanar_by_facing() {
        let mut node = BspNode::new();
        node.build(vec![make_triangle(
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
        )]);

        let same = make_triangle([0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        let opposite = make_triangle([0.0, 0.0, 0.0], [0.0, 2.0, 0.0], [2.0, 0.0, 0.0]);

        let kept = node.clip_polygons(vec![same.clone(), opposite]);
        assert_eq!(kept, vec![same]);
    }

    #[test]
    fn invert_twice_restores_tree() {
        let mut node = BspNode::new();
        node.build(vec![
            make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]),
            make_triangle([-0.5, -1.0, 0.5], [0.5, 1.0, 0.5], [0.5, -1.0, 0.5]),
        ]);
        let original = node.clone();

        node.invert();
        assert_ne!(node, original);
        assert_eq!(node.plane().unwrap().normal(), -Vector3::z());
        assert!(node.front().is_none());
        assert!(node.back().is_some());

        node.invert();
        assert_eq!(node, original);
    }

    #[test]
    fn all_polygons_is_preorder() {
        let root = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let front = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let back = make_triangle([0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]);

        let mut node = BspNode::new();
        node.build(vec![root.clone(), back.clone(), front.clone()]);

        assert_eq!(node.all_polygons(), vec![root.clone(), front.clone(), back.clone()]);
        assert_eq!(node.into_polygons(), vec![root, front, back]);
    }

    #[test]
    fn depth_and_leaf_status() {
        let mut node = BspNode::new();
        node.build(vec![
            make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]),
            make_triangle([0.0, 0.0, 2.0], [1.0, 0.0, 2.0], [0.0, 1.0, 2.0]),
        ]);

        assert!(!node.is_leaf());
        // root -> front -> front
        assert_eq!(node.depth(), 3);
        assert!(node.front().unwrap().front().unwrap().is_leaf());
    }
}
