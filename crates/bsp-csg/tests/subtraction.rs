use std::collections::HashSet;

use approx::assert_relative_eq;
use bsp_csg::primitives::cuboid;
use bsp_csg::{
    mesh_to_polygons, repair_mesh, subtract, subtract_polygons, CsgError, Mesh, Operand,
    RepairOptions, SceneSolid, SolidTag,
};
use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};

fn make_box(min: f32, max: f32) -> Mesh {
    cuboid(Point3::new(min, min, min), Point3::new(max, max, max))
}

fn position_set(mesh: &Mesh) -> HashSet<[i64; 3]> {
    mesh.positions
        .iter()
        .map(|p| [p.x, p.y, p.z].map(|x| (x * 1e4).round() as i64))
        .collect()
}

/// Distinct (normal, offset) planes the triangles of `mesh` lie on.
fn face_planes(mesh: &Mesh) -> HashSet<[i64; 4]> {
    mesh.triangles()
        .filter_map(|[a, b, c]| {
            let n = (b - a).cross(&(c - a)).try_normalize(1e-9)?;
            let d = n.dot(&a.coords);
            Some([n.x, n.y, n.z, d].map(|x| (x * 1e3).round() as i64))
        })
        .collect()
}

#[test]
fn corner_cut_removes_one_octant() {
    let target = make_box(0.0, 1.0);
    let tool = make_box(0.5, 1.5);
    let identity = Matrix4::identity();

    let raw = subtract(Operand::new(&target, &identity), Operand::new(&tool, &identity)).unwrap();
    assert_relative_eq!(raw.signed_volume(), 0.875, epsilon = 1e-4);

    let repaired = repair_mesh(&raw, &RepairOptions::default());
    assert!(repaired.validate().is_ok());
    assert_relative_eq!(repaired.signed_volume(), 0.875, epsilon = 1e-4);

    for [a, b, c] in repaired.triangles() {
        assert!((a - b).norm() > 1e-6);
        assert!((b - c).norm() > 1e-6);
        assert!((c - a).norm() > 1e-6);
    }

    let bounds = repaired.bounds.unwrap();
    assert_relative_eq!(bounds.min, Point3::origin(), epsilon = 1e-5);
    assert_relative_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-5);
}

#[test]
fn interior_tool_leaves_hollow_shell() {
    let target = make_box(0.0, 2.0);
    let tool = make_box(0.5, 1.5);
    let identity = Matrix4::identity();

    let a = mesh_to_polygons(&target, &identity, SolidTag::TARGET).unwrap();
    let b = mesh_to_polygons(&tool, &identity, SolidTag::TOOL).unwrap();
    let polygons = subtract_polygons(a, b);

    let center = Point3::new(1.0, 1.0, 1.0);
    let inner: Vec<_> = polygons.iter().filter(|p| p.tag() == SolidTag::TOOL).collect();
    assert_eq!(inner.len(), 12);
    for polygon in inner {
        let toward_center = center - polygon.centroid();
        assert!(polygon.facing_normal().dot(&toward_center) > 0.0);
    }

    let raw = subtract(Operand::new(&target, &identity), Operand::new(&tool, &identity)).unwrap();
    assert_relative_eq!(raw.signed_volume(), 7.0, epsilon = 1e-3);

    let repaired = repair_mesh(&raw, &RepairOptions::default());
    assert!(repaired.vertex_count() > 8);
    assert_eq!(face_planes(&repaired).len(), 12);
    assert_relative_eq!(repaired.signed_volume(), 7.0, epsilon = 1e-3);
}

#[test]
fn disjoint_tool_changes_nothing() {
    let target = make_box(0.0, 1.0);
    let tool = make_box(3.0, 4.0);
    let identity = Matrix4::identity();

    let raw = subtract(Operand::new(&target, &identity), Operand::new(&tool, &identity)).unwrap();

    assert_eq!(raw.triangle_count(), 12);
    assert_eq!(position_set(&raw), position_set(&target));
    assert_relative_eq!(raw.signed_volume(), 1.0, epsilon = 1e-5);
}

#[test]
fn empty_tool_returns_target() {
    let target = make_box(0.0, 1.0);
    let identity = Matrix4::identity();

    let raw = subtract(
        Operand::new(&target, &identity),
        Operand::new(&Mesh::default(), &identity),
    )
    .unwrap();

    assert_eq!(raw.triangle_count(), 12);
    assert_eq!(raw, polygons_roundtrip(&target));
}

fn polygons_roundtrip(mesh: &Mesh) -> Mesh {
    let polygons = mesh_to_polygons(mesh, &Matrix4::identity(), SolidTag::TARGET).unwrap();
    bsp_csg::polygons_to_mesh(&polygons)
}

#[test]
fn self_subtraction_is_empty() {
    let target = make_box(0.0, 1.0);
    let identity = Matrix4::identity();

    match subtract(Operand::new(&target, &identity), Operand::new(&target, &identity)) {
        Err(CsgError::EmptyResult { .. }) => {}
        Ok(mesh) => assert!(mesh.signed_volume().abs() < 1e-4),
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn scaled_tool_slices_target() {
    let target = make_box(0.0, 1.0);
    let tool = make_box(0.0, 1.0);
    let identity = Matrix4::identity();
    let tool_world = Matrix4::new_translation(&Vector3::new(0.5, -1.0, -1.0)) * Matrix4::new_scaling(3.0);

    let raw = subtract(Operand::new(&target, &identity), Operand::new(&tool, &tool_world)).unwrap();
    assert_relative_eq!(raw.signed_volume(), 0.5, epsilon = 1e-4);

    let repaired = repair_mesh(&raw, &RepairOptions::default());
    assert_relative_eq!(repaired.signed_volume(), 0.5, epsilon = 1e-4);
    assert_eq!(face_planes(&repaired).len(), 6);
}

#[test]
fn result_is_expressed_in_target_space() {
    let target = make_box(0.0, 1.0);
    let tool = make_box(0.0, 1.0);
    let target_world = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0))
        * Matrix4::new_rotation(Vector3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2));
    // the target's local +x half, seen from the world
    let tool_world = target_world * Matrix4::new_translation(&Vector3::new(0.5, -0.5, -0.5)) * Matrix4::new_scaling(2.0);

    let raw = subtract(
        Operand::new(&target, &target_world),
        Operand::new(&tool, &tool_world),
    )
    .unwrap();

    let bounds = raw.bounds.unwrap();
    assert_relative_eq!(bounds.min, Point3::origin(), epsilon = 1e-4);
    assert_relative_eq!(bounds.max, Point3::new(0.5, 1.0, 1.0), epsilon = 1e-4);
    assert_relative_eq!(raw.signed_volume(), 0.5, epsilon = 1e-4);
}

#[test]
fn raw_output_skips_coplanar_stage_when_disabled() {
    let target = make_box(0.0, 1.0);
    let tool = make_box(0.5, 1.5);
    let identity = Matrix4::identity();
    let raw = subtract(Operand::new(&target, &identity), Operand::new(&tool, &identity)).unwrap();

    let welded_only = repair_mesh(&raw, &RepairOptions::default().with_coplanar_reconstruction(false));
    assert!(welded_only.is_indexed());
    assert!(welded_only.vertex_count() < raw.vertex_count());
    assert_relative_eq!(welded_only.signed_volume(), 0.875, epsilon = 1e-4);
}

/// Seeded LCG so rotated scenes are reproducible.
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

/// Boxes of edge 1..2 centered in [-2, 2]^3, each spun about a random axis.
fn rotated_tools(seed: u64, count: usize) -> Vec<SceneSolid> {
    let mut rng = Rng::new(seed);
    (0..count)
        .map(|_| {
            let center = Vector3::new(rng.range(-2.0, 2.0), rng.range(-2.0, 2.0), rng.range(-2.0, 2.0));
            let axis = Vector3::new(rng.next_f32() - 0.5, rng.next_f32() - 0.5, rng.next_f32() - 0.5);
            let axis = if axis.norm() > 0.01 {
                Unit::new_normalize(axis)
            } else {
                Vector3::x_axis()
            };
            let rotation = Rotation3::from_axis_angle(&axis, rng.next_f32() * std::f32::consts::TAU);
            let half = rng.range(0.5, 1.0);
            SceneSolid::new(
                make_box(-half, half),
                Matrix4::new_translation(&center) * rotation.to_homogeneous(),
            )
        })
        .collect()
}

fn apply_rotated_cuts(seed: u64, options: &RepairOptions) {
    let mut target = SceneSolid::at_origin(make_box(-2.0, 2.0));

    for (i, tool) in rotated_tools(seed, 4).iter().enumerate() {
        let before = target.mesh.signed_volume();
        match target.subtract_into(tool, options) {
            Ok(report) => {
                let raw = report.raw.signed_volume();
                let repaired = target.mesh.signed_volume();
                assert!(raw <= before + 1e-3, "seed {seed} cut {i}: volume grew");
                assert!(
                    (raw - repaired).abs() < 1e-3,
                    "seed {seed} cut {i}: raw {raw} vs repaired {repaired}"
                );
                assert!(target.mesh.validate().is_ok());
            }
            Err(CsgError::EmptyResult { .. }) => {}
            Err(err) => panic!("seed {seed} cut {i}: {err}"),
        }
    }
}

#[test]
fn sequential_rotated_cuts_terminate_and_keep_volume() {
    let options = RepairOptions::default();
    for seed in [10, 31, 42] {
        apply_rotated_cuts(seed, &options);
    }
}

#[test]
fn sequential_rotated_cuts_without_coplanar_stage() {
    let options = RepairOptions::default().with_coplanar_reconstruction(false);
    for seed in [10, 31, 42] {
        apply_rotated_cuts(seed, &options);
    }
}
