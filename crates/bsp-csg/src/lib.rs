//! Solid subtraction on triangle meshes with BSP trees, plus clean-up of the
//! fragmented result.
//!
//! [`subtract`] bakes two meshes into world space, cuts the tool out of the
//! target with the classic clip/invert sequence and returns the remainder in
//! the target's local space. [`repair_mesh`] then removes slivers, welds
//! duplicate vertices and re-triangulates coplanar runs.
//!
//! ```
//! use bsp_csg::{primitives::cuboid, subtract, repair_mesh, Operand, RepairOptions};
//! use nalgebra::{Matrix4, Point3, Vector3};
//!
//! let target = cuboid(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
//! let tool = target.clone();
//! let identity = Matrix4::identity();
//! let shifted = Matrix4::new_translation(&Vector3::repeat(0.5));
//!
//! let raw = subtract(Operand::new(&target, &identity), Operand::new(&tool, &shifted))?;
//! let repaired = repair_mesh(&raw, &RepairOptions::default());
//! assert!((repaired.signed_volume() - 0.875).abs() < 1e-4);
//! # Ok::<(), bsp_csg::CsgError>(())
//! ```

pub mod bsp;
pub mod primitives;

mod boolean;
mod error;
mod mesh;
mod plane;
mod polygon;
mod repair;
mod scene;
mod solid;
mod split;
mod vertex;

pub use boolean::{subtract, subtract_polygons, Operand};
pub use bsp::{BspNode, BspTree};
pub use error::{CsgError, Result};
pub use mesh::{Aabb, Mesh};
pub use plane::{Classification, Plane3D, PlaneSide, PLANE_EPSILON};
pub use polygon::{Polygon, SolidTag};
pub use repair::{
    reconstruct_coplanar, repair_mesh, weld_vertices, RepairOptions,
    DEFAULT_WELD_TOLERANCE, DEGENERATE_EPSILON,
};
pub use scene::{SceneSolid, SubtractReport};
pub use solid::{mesh_to_polygons, polygons_to_mesh, Solid};
pub use split::Partition;
pub use vertex::{normal_matrix, Vertex};
