//! BSP tree container used by the boolean driver.

use crate::Polygon;

use super::node::BspNode;

/// A Binary Space Partitioning tree describing one solid.
///
/// The tree recursively partitions space using the planes of the solid's own
/// polygons. Polygons on a node's plane are stored at that node; everything
/// else lives in the front or back subtree. For a closed, outward-facing
/// solid, a missing back child marks a region inside the solid and a missing
/// front child marks a region outside it, which is what
/// [`clip_to`](Self::clip_to) relies on.
///
/// # Construction
///
/// ```
/// use bsp_csg::{primitives, BspTree, Solid, SolidTag};
/// use nalgebra::{Matrix4, Point3};
///
/// let mesh = primitives::cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
/// let solid = Solid::from_mesh(&mesh, &Matrix4::identity(), SolidTag(0))?;
/// let tree = BspTree::from_polygons(solid.into_polygons());
/// assert_eq!(tree.polygon_count(), 12);
/// # Ok::<(), bsp_csg::CsgError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BspTree {
    root: BspNode,
}

impl BspTree {
    /// Creates an empty BSP tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a BSP tree from a collection of polygons.
    ///
    /// Spanning polygons are split on insertion. Returns an empty tree if the
    /// input is empty.
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        let mut tree = Self::new();
        tree.build(polygons);
        tree
    }

    /// Adds polygons to the existing partition.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        self.root.build(polygons);
    }

    /// Returns `true` if the tree has no splitting plane yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.plane().is_none()
    }

    /// Returns a reference to the root node.
    #[inline]
    pub fn root(&self) -> &BspNode {
        &self.root
    }

    /// Removes from `polygons` everything inside this tree's solid.
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        self.root.clip_polygons(polygons)
    }

    /// Removes from this tree every polygon part inside `other`'s solid.
    pub fn clip_to(&mut self, other: &BspTree) {
        self.root.clip_to(&other.root);
    }

    /// Swaps inside and outside of the described solid.
    pub fn invert(&mut self) {
        self.root.invert();
    }

    /// Copies out all polygons in pre-order.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        self.root.all_polygons()
    }

    /// Consumes the tree, yielding its polygons in pre-order.
    pub fn into_polygons(self) -> Vec<Polygon> {
        self.root.into_polygons()
    }

    /// Returns the total number of polygons in the tree.
    pub fn polygon_count(&self) -> usize {
        self.root.polygon_count()
    }

    /// Returns the maximum depth of the tree (0 for empty tree).
    pub fn depth(&self) -> usize {
        if self.is_empty() { 0 } else { self.root.depth() }
    }
}
