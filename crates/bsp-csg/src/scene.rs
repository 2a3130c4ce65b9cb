//! Scene-side application of a subtraction.

use nalgebra::Matrix4;
use tracing::{info, instrument};

use crate::boolean::{subtract, Operand};
use crate::error::Result;
use crate::{repair_mesh, Mesh, RepairOptions};

/// A mesh placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSolid {
    pub mesh: Mesh,
    pub world: Matrix4<f32>,
}

/// What a committed subtraction produced.
#[derive(Debug, Clone)]
pub struct SubtractReport {
    /// The unrepaired boolean output, in target-local space.
    pub raw: Mesh,
    pub vertices_before: usize,
    pub triangles_before: usize,
    pub vertices_after: usize,
    pub triangles_after: usize,
}

impl SceneSolid {
    pub fn new(mesh: Mesh, world: Matrix4<f32>) -> Self {
        Self { mesh, world }
    }

    /// Placed at the origin.
    pub fn at_origin(mesh: Mesh) -> Self {
        Self::new(mesh, Matrix4::identity())
    }

    fn operand(&self) -> Operand<'_> {
        Operand::new(&self.mesh, &self.world)
    }

    /// Cuts `tool` out of this solid and repairs the result.
    ///
    /// The mesh is swapped only once the repaired result exists; on error
    /// `self` is untouched. On `Ok` the caller is expected to remove the
    /// tool from the scene.
    #[instrument(skip_all)]
    pub fn subtract_into(&mut self, tool: &SceneSolid, options: &RepairOptions) -> Result<SubtractReport> {
        let raw = subtract(self.operand(), tool.operand())?;
        let repaired = repair_mesh(&raw, options);

        let vertices_after = repaired.vertex_count();
        let triangles_after = repaired.triangle_count();
        let previous = std::mem::replace(&mut self.mesh, repaired);

        let report = SubtractReport {
            raw,
            vertices_before: previous.vertex_count(),
            triangles_before: previous.triangle_count(),
            vertices_after,
            triangles_after,
        };
        drop(previous);

        info!(
            vertices = report.vertices_after,
            triangles = report.triangles_after,
            "target geometry replaced"
        );
        Ok(report)
    }
}
