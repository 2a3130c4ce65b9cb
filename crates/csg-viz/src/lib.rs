//! Shared rendering and camera utilities for the subtraction viewers.

use bsp_csg::primitives::cuboid;
use bsp_csg::{Mesh as CsgMesh, SceneSolid};
use macroquad::models::{draw_mesh, Mesh, Vertex};
use macroquad::prelude::*;
use nalgebra::{Matrix4, Point3, Vector3};

pub mod inspector;
pub use inspector::{Inspector, ViewMode};

/// Largest number of triangles sent to macroquad in one draw call
/// (u16 indices).
const TRIANGLES_PER_BATCH: usize = u16::MAX as usize / 3;

fn to_vec3(p: &Point3<f32>) -> Vec3 {
    vec3(p.x, p.y, p.z)
}

/// Darkens `base` by how far the face turns away from a fixed light.
fn shade(base: Color, normal: &Vector3<f32>) -> Color {
    let light = Vector3::new(0.4, 0.8, 0.45).normalize();
    let k = 0.35 + 0.65 * normal.dot(&light).max(0.0);
    Color::new(base.r * k, base.g * k, base.b * k, base.a)
}

/// Draws a mesh placed with `world`, flat shaded per triangle.
pub fn draw_solid(mesh: &CsgMesh, world: &Matrix4<f32>, base: Color) {
    let triangles: Vec<[Point3<f32>; 3]> = mesh
        .triangles()
        .map(|t| t.map(|p| world.transform_point(&p)))
        .collect();

    for batch in triangles.chunks(TRIANGLES_PER_BATCH) {
        let mut vertices = Vec::with_capacity(batch.len() * 3);
        for [a, b, c] in batch {
            let normal = (b - a).cross(&(c - a)).try_normalize(1e-12).unwrap_or_else(Vector3::y);
            let color = shade(base, &normal);
            for p in [a, b, c] {
                vertices.push(Vertex::new2(to_vec3(p), vec2(0.0, 0.0), color));
            }
        }
        let indices = (0..vertices.len() as u16).collect();

        draw_mesh(&Mesh {
            vertices,
            indices,
            texture: None,
        });
    }
}

/// Draws every triangle edge of a mesh placed with `world`.
pub fn draw_wireframe(mesh: &CsgMesh, world: &Matrix4<f32>, color: Color) {
    for [a, b, c] in mesh.triangles() {
        let [a, b, c] = [a, b, c].map(|p| to_vec3(&world.transform_point(&p)));
        draw_line_3d(a, b, color);
        draw_line_3d(b, c, color);
        draw_line_3d(c, a, color);
    }
}

/// A box of edge `size` centered on the origin, placed at `center`.
pub fn centered_box(center: Vector3<f32>, size: f32) -> SceneSolid {
    let half = Point3::from(Vector3::repeat(size / 2.0));
    SceneSolid::new(
        cuboid(Point3::origin() - half.coords, half),
        Matrix4::new_translation(&center),
    )
}

/// Simple orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    /// Minimum distance from target
    pub min_distance: f32,
    /// Maximum distance from target
    pub max_distance: f32,
}

impl OrbitCamera {
    /// Creates a new orbit camera with the given configuration.
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: vec3(0.0, 0.0, 0.0),
            zoom_speed: 1.0,
            min_distance: 2.0,
            max_distance: 60.0,
        }
    }

    /// Sets the zoom configuration (speed and distance limits).
    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Updates camera state from mouse drag and scroll.
    ///
    /// Arrow keys are left to the tool controls.
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }

        // Clamp pitch to avoid gimbal lock
        self.pitch = self.pitch.clamp(-1.5, 1.5);

        let scroll = mouse_wheel().1;
        self.distance -= scroll * self.zoom_speed;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }

    /// Returns the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    /// Converts to macroquad's Camera3D for rendering.
    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: vec3(0.0, 1.0, 0.0),
            target: self.target,
            ..Default::default()
        }
    }
}

/// Installs a `tracing` subscriber: `warn` overall, `info` for the engine,
/// overridable through `RUST_LOG`.
pub fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("bsp_csg=info".parse().unwrap_or_default())
        .add_directive("csg_viz=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
