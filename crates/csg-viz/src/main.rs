use bsp_csg::{RepairOptions, SceneSolid};
use csg_viz::{centered_box, draw_solid, draw_wireframe, init_logging, Inspector, OrbitCamera};
use macroquad::prelude::*;
use nalgebra::{Matrix4, Vector3};
use tracing::{info, warn};

const TOOL_STEP: f32 = 0.05;

/// Moves the tool with the arrow keys (x/z) and PageUp/PageDown (y).
fn move_tool(tool: &mut SceneSolid) {
    let mut delta: Vector3<f32> = Vector3::zeros();
    if is_key_down(KeyCode::Left) {
        delta.x -= TOOL_STEP;
    }
    if is_key_down(KeyCode::Right) {
        delta.x += TOOL_STEP;
    }
    if is_key_down(KeyCode::Up) {
        delta.z -= TOOL_STEP;
    }
    if is_key_down(KeyCode::Down) {
        delta.z += TOOL_STEP;
    }
    if is_key_down(KeyCode::PageUp) {
        delta.y += TOOL_STEP;
    }
    if is_key_down(KeyCode::PageDown) {
        delta.y -= TOOL_STEP;
    }
    if delta != Vector3::zeros() {
        tool.world = Matrix4::new_translation(&delta) * tool.world;
    }
}

#[macroquad::main("CSG Subtraction")]
async fn main() {
    init_logging();

    let options = RepairOptions::default();
    let mut target = centered_box(Vector3::zeros(), 4.0);
    let mut tool = Some(centered_box(Vector3::new(1.5, 1.5, 1.5), 2.0));
    let mut camera = OrbitCamera::new(12.0, 0.6, 0.4).with_zoom(0.5, 5.0, 30.0);
    let mut inspector = Inspector::new();

    loop {
        camera.update();
        inspector.update();

        if let Some(t) = tool.as_mut() {
            move_tool(t);
        }

        if is_key_pressed(KeyCode::Space) {
            if let Some(t) = tool.as_ref() {
                match target.subtract_into(t, &options) {
                    Ok(report) => {
                        info!(
                            vertices = report.vertices_after,
                            triangles = report.triangles_after,
                            "tool applied"
                        );
                        inspector.record(report);
                        // the tool is consumed by the cut
                        tool = None;
                    }
                    Err(err) => {
                        warn!(%err, "subtraction rejected, target unchanged");
                        inspector.set_status(format!("rejected: {err}"));
                    }
                }
            }
        }
        if is_key_pressed(KeyCode::N) && tool.is_none() {
            tool = Some(centered_box(Vector3::new(0.0, 2.0, 0.0), 1.5));
        }

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera.to_camera3d());

        let displayed = inspector.displayed(&target.mesh);
        draw_solid(displayed, &target.world, Color::from_rgba(200, 170, 120, 255));
        if inspector.wireframe() {
            draw_wireframe(displayed, &target.world, BLACK);
        }
        if let Some(t) = tool.as_ref() {
            draw_wireframe(&t.mesh, &t.world, RED);
        }

        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(4.0, 0.0, 0.0), RED);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 4.0, 0.0), GREEN);
        draw_line_3d(vec3(0.0, 0.0, 0.0), vec3(0.0, 0.0, 4.0), BLUE);

        set_default_camera();

        draw_text("CSG Subtraction", 10.0, 25.0, 20.0, WHITE);
        inspector.draw_ui(displayed, 50.0);
        draw_text(
            "Arrows/PgUp/PgDn move tool | [Space] cut | [N] new tool",
            10.0,
            115.0,
            16.0,
            DARKGRAY,
        );
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 135.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
