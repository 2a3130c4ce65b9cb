//! Binary Space Partitioning trees for polygon clipping.
//!
//! A tree built from a closed solid's polygons doubles as an inside/outside
//! oracle for that solid. The boolean driver combines two trees with three
//! primitives:
//!
//! - [`BspTree::clip_to`]: drop polygon parts lying inside the other solid
//! - [`BspTree::invert`]: swap the inside and outside of a solid
//! - [`BspTree::build`]: merge extra polygons into an existing partition
//!
//! # Architecture
//!
//! - [`BspTree`]: The container holding the root node
//! - [`BspNode`]: Recursive nodes storing a splitting plane and coplanar polygons

mod node;
mod tree;

pub use node::BspNode;
pub use tree::BspTree;
