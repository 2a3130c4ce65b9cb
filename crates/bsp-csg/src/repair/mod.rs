//! Clean-up of boolean results.
//!
//! Three stages run in order, each falling back to the previous stage's
//! output when it cannot produce a usable mesh:
//!
//! 1. [`remove_degenerate`]: de-index and drop triangles with coincident corners
//! 2. [`weld_vertices`]: merge vertices closer than the weld tolerance
//! 3. [`reconstruct_coplanar`]: re-triangulate runs of coplanar triangles
//!
//! Stage failures are logged and never surfaced to the caller.

mod coplanar;
mod degenerate;
mod weld;

pub use coplanar::reconstruct_coplanar;
use degenerate::remove_degenerate;
pub use weld::weld_vertices;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::Mesh;

/// Corner distance at or below which a triangle counts as degenerate.
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Default distance under which vertices are welded.
pub const DEFAULT_WELD_TOLERANCE: f32 = 1e-4;

/// Why a repair stage gave up. Only ever logged.
#[derive(Debug, Error)]
pub(crate) enum RepairFailure {
    #[error("stage left {indices} indices, need at least 3")]
    TooFewIndices { indices: usize },

    #[error("tolerance {0} is not a positive finite number")]
    BadTolerance(f32),

    #[error("group outline has {vertices} vertices, need at least 3")]
    OutlineTooShort { vertices: usize },

    #[error("rebuilt area {rebuilt} differs from original {original}")]
    AreaMismatch { original: f64, rebuilt: f64 },

    #[error("outline triangulation failed: {0}")]
    Triangulation(String),
}

/// Tunables for [`repair_mesh`].
#[derive(Debug, Clone, PartialEq)]
pub struct RepairOptions {
    /// Vertices closer than this are merged.
    pub weld_tolerance: f32,
    /// Triangles with two corners this close are dropped.
    pub degenerate_epsilon: f32,
    /// Run the coplanar reconstruction stage.
    pub reconstruct_coplanar: bool,
    /// Maximum angle between normals of grouped triangles.
    pub coplanar_angle_degrees: f32,
    /// Maximum distance of a grouped triangle's centroid from the seed plane.
    pub planar_tolerance: f32,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            weld_tolerance: DEFAULT_WELD_TOLERANCE,
            degenerate_epsilon: DEGENERATE_EPSILON,
            reconstruct_coplanar: true,
            coplanar_angle_degrees: 1.0,
            planar_tolerance: 1e-4,
        }
    }
}

impl RepairOptions {
    /// Sets the weld tolerance.
    pub fn with_weld_tolerance(mut self, tolerance: f32) -> Self {
        self.weld_tolerance = tolerance;
        self
    }

    /// Enables or disables coplanar reconstruction.
    pub fn with_coplanar_reconstruction(mut self, enabled: bool) -> Self {
        self.reconstruct_coplanar = enabled;
        self
    }

    /// Sets the coplanar grouping limits (normal angle and plane distance).
    pub fn with_coplanar_limits(mut self, angle_degrees: f32, planar_tolerance: f32) -> Self {
        self.coplanar_angle_degrees = angle_degrees;
        self.planar_tolerance = planar_tolerance;
        self
    }
}

/// Runs the full repair pipeline on `mesh`.
///
/// Never fails: a stage that cannot produce a usable mesh hands the best
/// earlier result to the next stage.
#[instrument(skip_all)]
pub fn repair_mesh(mesh: &Mesh, options: &RepairOptions) -> Mesh {
    info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "repair started"
    );

    let cleaned = match remove_degenerate(mesh, options.degenerate_epsilon) {
        Ok(cleaned) => cleaned,
        Err(err) => {
            warn!(%err, "degenerate removal failed, keeping input");
            mesh.clone()
        }
    };
    debug!(
        stage = "degenerate",
        vertices = cleaned.vertex_count(),
        triangles = cleaned.triangle_count()
    );

    let welded = weld_vertices(&cleaned, options.weld_tolerance);
    debug!(
        stage = "weld",
        vertices = welded.vertex_count(),
        triangles = welded.triangle_count()
    );

    if !options.reconstruct_coplanar {
        return welded;
    }

    let rebuilt = reconstruct_coplanar(&welded, options);
    info!(
        vertices = rebuilt.vertex_count(),
        triangles = rebuilt.triangle_count(),
        "repair finished"
    );
    rebuilt
}
