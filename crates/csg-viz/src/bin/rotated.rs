use bsp_csg::{RepairOptions, SceneSolid};
use csg_viz::{centered_box, draw_solid, draw_wireframe, init_logging, Inspector, OrbitCamera};
use macroquad::prelude::*;
use nalgebra::{Matrix4, Rotation3, Unit, Vector3};
use tracing::{info, warn};

const NUM_TOOLS: usize = 4;

/// Simple seeded random number generator (LCG).
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_f32(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.state >> 33) as f32) / (u32::MAX as f32 / 2.0)
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// Boxes spinning about random axes, placed around the target's surface.
fn random_rotated_tools(seed: u64) -> Vec<SceneSolid> {
    let mut rng = Rng::new(seed);
    (0..NUM_TOOLS)
        .map(|_| {
            let center = Vector3::new(
                rng.range(-2.0, 2.0),
                rng.range(-2.0, 2.0),
                rng.range(-2.0, 2.0),
            );
            let axis = Vector3::new(rng.next_f32() - 0.5, rng.next_f32() - 0.5, rng.next_f32() - 0.5);
            let axis = if axis.norm() > 0.01 {
                Unit::new_normalize(axis)
            } else {
                Vector3::x_axis()
            };
            let rotation = Rotation3::from_axis_angle(&axis, rng.next_f32() * std::f32::consts::TAU);

            let mut tool = centered_box(Vector3::zeros(), rng.range(1.0, 2.0));
            tool.world = Matrix4::new_translation(&center) * rotation.to_homogeneous();
            tool
        })
        .collect()
}

#[macroquad::main("CSG Rotated Tools")]
async fn main() {
    init_logging();

    let options = RepairOptions::default();
    let mut target = centered_box(Vector3::zeros(), 4.0);
    let mut inspector = Inspector::new();

    for (i, tool) in random_rotated_tools(42).iter().enumerate() {
        match target.subtract_into(tool, &options) {
            Ok(report) => {
                info!(tool = i, triangles = report.triangles_after, "rotated tool applied");
                inspector.record(report);
            }
            Err(err) => warn!(tool = i, %err, "rotated tool rejected"),
        }
    }

    let mut camera = OrbitCamera::new(14.0, 0.6, 0.4).with_zoom(1.0, 6.0, 40.0);

    loop {
        camera.update();
        inspector.update();

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera.to_camera3d());

        let displayed = inspector.displayed(&target.mesh);
        draw_solid(displayed, &target.world, Color::from_rgba(140, 180, 220, 255));
        if inspector.wireframe() {
            draw_wireframe(displayed, &target.world, BLACK);
        }

        set_default_camera();

        draw_text(
            &format!("CSG Rotated Tools - {} cuts", NUM_TOOLS),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        inspector.draw_ui(displayed, 50.0);
        draw_text("Drag mouse to rotate, scroll to zoom", 10.0, 115.0, 16.0, DARKGRAY);
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 135.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
