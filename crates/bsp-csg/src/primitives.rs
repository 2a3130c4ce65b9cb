//! Simple closed meshes for tests and demos.

use nalgebra::{Point2, Point3, Vector3};

use crate::Mesh;

/// Generates an axis-aligned box between `min` and `max`.
///
/// Each face owns four vertices with a flat outward normal and unit-square
/// uvs; triangles are wound counter-clockwise seen from outside.
pub fn cuboid(min: Point3<f32>, max: Point3<f32>) -> Mesh {
    // 8 corners of the box
    let corners = [
        Point3::new(min.x, min.y, min.z), // 0: left-bottom-back
        Point3::new(max.x, min.y, min.z), // 1: right-bottom-back
        Point3::new(max.x, max.y, min.z), // 2: right-top-back
        Point3::new(min.x, max.y, min.z), // 3: left-top-back
        Point3::new(min.x, min.y, max.z), // 4: left-bottom-front
        Point3::new(max.x, min.y, max.z), // 5: right-bottom-front
        Point3::new(max.x, max.y, max.z), // 6: right-top-front
        Point3::new(min.x, max.y, max.z), // 7: left-top-front
    ];

    let faces: [([usize; 4], Vector3<f32>); 6] = [
        ([4, 5, 6, 7], Vector3::z()),  // front (+Z)
        ([1, 0, 3, 2], -Vector3::z()), // back (-Z)
        ([0, 4, 7, 3], -Vector3::x()), // left (-X)
        ([5, 1, 2, 6], Vector3::x()),  // right (+X)
        ([7, 6, 2, 3], Vector3::y()),  // top (+Y)
        ([0, 1, 5, 4], -Vector3::y()), // bottom (-Y)
    ];
    let quad_uvs = [
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut uvs = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (corner_ids, normal) in faces {
        let base = positions.len() as u32;
        for (k, &id) in corner_ids.iter().enumerate() {
            positions.push(corners[id]);
            normals.push(normal);
            uvs.push(quad_uvs[k]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    let mut mesh = Mesh::new(positions, normals)
        .with_uvs(uvs)
        .with_indices(indices);
    mesh.compute_bounds();
    mesh
}
