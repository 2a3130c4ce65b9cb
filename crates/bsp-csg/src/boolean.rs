//! Solid subtraction driver.

use nalgebra::Matrix4;
use tracing::{debug, info, instrument, warn};

use crate::error::{CsgError, Result};
use crate::solid::{polygons_to_mesh, Solid};
use crate::{BspTree, Mesh, Polygon, SolidTag};

/// A mesh together with the world transform it is placed with.
#[derive(Debug, Clone, Copy)]
pub struct Operand<'a> {
    pub mesh: &'a Mesh,
    pub world: &'a Matrix4<f32>,
}

impl<'a> Operand<'a> {
    pub fn new(mesh: &'a Mesh, world: &'a Matrix4<f32>) -> Self {
        Self { mesh, world }
    }
}

/// Subtracts `tool` from `target`.
///
/// Both meshes are baked into world space, clipped against each other, and
/// the result is expressed back in the target's local space as a
/// non-indexed triangle mesh. Nothing is repaired here; see
/// [`repair_mesh`](crate::repair_mesh).
///
/// A tool without triangles leaves the target as it is. A target without
/// triangles has nothing to cut and reports [`CsgError::EmptyResult`].
///
/// # Errors
///
/// - [`CsgError::EmptyResult`] when fewer than three vertices survive,
///   including an empty target; the caller must leave the target untouched
/// - [`CsgError::InvalidMesh`] for inconsistent input buffers
/// - [`CsgError::SingularTransform`] when a world matrix cannot be inverted
#[instrument(skip_all)]
pub fn subtract(target: Operand<'_>, tool: Operand<'_>) -> Result<Mesh> {
    let to_local = target
        .world
        .try_inverse()
        .ok_or(CsgError::SingularTransform)?;

    let a = Solid::from_mesh(target.mesh, target.world, SolidTag::TARGET)?;
    let b = Solid::from_mesh(tool.mesh, tool.world, SolidTag::TOOL)?;
    info!(
        target_polygons = a.polygons().len(),
        tool_polygons = b.polygons().len(),
        "subtracting solids"
    );

    let polygons = subtract_polygons(a.into_polygons(), b.into_polygons());

    let vertex_count: usize = polygons.iter().map(Polygon::len).sum();
    if vertex_count < 3 {
        warn!(vertex_count, "subtraction left no usable geometry");
        return Err(CsgError::EmptyResult { vertex_count });
    }

    let mut mesh = polygons_to_mesh(&polygons);
    mesh.transform(&to_local)?;
    info!(
        polygons = polygons.len(),
        triangles = mesh.triangle_count(),
        "subtraction finished"
    );
    Ok(mesh)
}

/// Subtracts the `tool` polygon soup from the `target` soup.
///
/// An empty tool returns the target unchanged and an empty target returns
/// nothing; otherwise the classic clip/invert sequence runs over two fresh
/// trees:
///
/// 1. invert A, clip A to B
/// 2. clip B to A, invert B, clip B to A, invert B
/// 3. build B's remains into A, invert A
pub fn subtract_polygons(target: Vec<Polygon>, tool: Vec<Polygon>) -> Vec<Polygon> {
    if tool.is_empty() {
        debug!(
            target = target.len(),
            "tool has no polygons, keeping target as is"
        );
        return target;
    }
    if target.is_empty() {
        debug!("target has no polygons, nothing to cut");
        return Vec::new();
    }

    let mut a = BspTree::from_polygons(target);
    let mut b = BspTree::from_polygons(tool);
    debug!(
        a_depth = a.depth(),
        b_depth = b.depth(),
        a_polygons = a.polygon_count(),
        b_polygons = b.polygon_count(),
        "trees built"
    );

    a.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.into_polygons());
    a.invert();

    a.into_polygons()
}
