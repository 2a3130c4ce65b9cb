//! Coplanar region reconstruction.
//!
//! Adjacent triangles on one plane are merged into a single outline and
//! re-triangulated with a constrained Delaunay triangulation. A group is
//! only replaced when the rebuilt outline covers the original triangles and
//! keeps their area; otherwise its triangles pass through untouched.

use std::collections::{HashMap, HashSet};

use nalgebra::{Point2, Point3, Vector3};
use spade::{ConstrainedDelaunayTriangulation, InsertionError, Point2 as CdtPoint, Triangulation};
use tracing::{debug, instrument};

use super::{RepairFailure, RepairOptions, DEFAULT_WELD_TOLERANCE};
use crate::Mesh;

/// Geometric data of one input triangle.
struct Facet {
    normal: Option<Vector3<f32>>,
    centroid: Point3<f32>,
    area: f32,
}

impl Facet {
    fn of(mesh: &Mesh, [a, b, c]: [usize; 3]) -> Self {
        let (pa, pb, pc) = (mesh.positions[a], mesh.positions[b], mesh.positions[c]);
        let cross = (pb - pa).cross(&(pc - pa));
        Self {
            normal: cross.try_normalize(1e-12),
            centroid: Point3::from((pa.coords + pb.coords + pc.coords) / 3.0),
            area: 0.5 * cross.norm(),
        }
    }
}

/// A re-triangulated coplanar group: outline vertices plus triangles over them.
struct Patch {
    normal: Vector3<f32>,
    /// Source vertex of each outline corner, in outline order.
    corners: Vec<usize>,
    triangles: Vec<[usize; 3]>,
}

/// Output buffers with optional uvs.
struct Buffers {
    positions: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
    uvs: Option<Vec<Point2<f32>>>,
    indices: Vec<u32>,
}

impl Buffers {
    fn push_vertex(&mut self, mesh: &Mesh, source: usize, normal: Vector3<f32>) -> u32 {
        self.positions.push(mesh.positions[source]);
        self.normals.push(normal);
        if let (Some(out), Some(src)) = (self.uvs.as_mut(), mesh.uvs.as_ref()) {
            out.push(src[source]);
        }
        (self.positions.len() - 1) as u32
    }
}

/// Replaces each run of coplanar triangles with a fresh triangulation of
/// its outline.
///
/// Triangles are grouped greedily: a seed collects every later ungrouped
/// triangle whose normal lies within the configured angle and whose
/// centroid lies within the planar tolerance of the seed's plane. The
/// boundary of a group (edges used by exactly one of its triangles) is
/// sorted by angle about its centroid and triangulated with a constrained
/// Delaunay triangulation. New vertices take the group normal.
///
/// A group whose outline cannot be rebuilt, or whose rebuilt area differs
/// from the original, keeps its triangles. Concave and multi-island groups
/// fall in that bucket.
#[instrument(skip_all)]
pub fn reconstruct_coplanar(mesh: &Mesh, options: &RepairOptions) -> Mesh {
    let triangles: Vec<[usize; 3]> = mesh.triangle_indices().collect();
    let facets: Vec<Facet> = triangles.iter().map(|&t| Facet::of(mesh, t)).collect();

    let mut patches: HashMap<usize, Patch> = HashMap::new();
    let mut replaced = vec![false; triangles.len()];

    for (normal, group) in group_coplanar(&facets, options) {
        if group.len() < 2 {
            continue;
        }
        match rebuild_group(mesh, &triangles, &facets, &group, normal, options) {
            Ok(patch) => {
                for &t in &group {
                    replaced[t] = true;
                }
                patches.insert(group[0], patch);
            }
            Err(err) => {
                debug!(%err, triangles = group.len(), "coplanar group kept as is");
            }
        }
    }

    if patches.is_empty() {
        return mesh.clone();
    }
    debug!(groups = patches.len(), "coplanar groups rebuilt");
    splice(mesh, &triangles, &replaced, patches)
}

/// Greedy grouping by seed plane. Triangles without a normal stay ungrouped.
fn group_coplanar(facets: &[Facet], options: &RepairOptions) -> Vec<(Vector3<f32>, Vec<usize>)> {
    let cos_limit = options.coplanar_angle_degrees.to_radians().cos();
    let mut grouped = vec![false; facets.len()];
    let mut groups = Vec::new();

    for seed in 0..facets.len() {
        if grouped[seed] {
            continue;
        }
        let Some(normal) = facets[seed].normal else {
            continue;
        };
        grouped[seed] = true;
        let origin = facets[seed].centroid;
        let mut members = vec![seed];

        for other in seed + 1..facets.len() {
            if grouped[other] {
                continue;
            }
            let Some(other_normal) = facets[other].normal else {
                continue;
            };
            let distance = normal.dot(&(facets[other].centroid - origin)).abs();
            if other_normal.dot(&normal) >= cos_limit && distance <= options.planar_tolerance {
                grouped[other] = true;
                members.push(other);
            }
        }
        groups.push((normal, members));
    }
    groups
}

fn rebuild_group(
    mesh: &Mesh,
    triangles: &[[usize; 3]],
    facets: &[Facet],
    group: &[usize],
    normal: Vector3<f32>,
    options: &RepairOptions,
) -> Result<Patch, RepairFailure> {
    let outline = boundary_vertices(mesh, triangles, group, options.weld_tolerance);
    if outline.len() < 3 {
        return Err(RepairFailure::OutlineTooShort {
            vertices: outline.len(),
        });
    }

    let (u, v) = plane_basis(&normal);
    let center = outline
        .iter()
        .fold(Vector3::zeros(), |acc, &i| acc + mesh.positions[i].coords)
        / outline.len() as f32;

    let mut projected: Vec<(usize, [f64; 2])> = outline
        .iter()
        .map(|&i| {
            let d = mesh.positions[i].coords - center;
            (i, [f64::from(d.dot(&u)), f64::from(d.dot(&v))])
        })
        .collect();
    projected.sort_by(|(_, a), (_, b)| a[1].atan2(a[0]).total_cmp(&b[1].atan2(b[0])));

    let ring: Vec<[f64; 2]> = projected.iter().map(|&(_, p)| p).collect();
    let escaped = group.iter().any(|&t| {
        let d = facets[t].centroid.coords - center;
        !ring_contains(&ring, [f64::from(d.dot(&u)), f64::from(d.dot(&v))])
    });
    if escaped {
        return Err(RepairFailure::Triangulation(
            "outline does not cover the group".into(),
        ));
    }
    let mut triangles_2d = triangulate_ring(&ring)?;

    for tri in &mut triangles_2d {
        if signed_area(&ring, *tri) < 0.0 {
            tri.swap(1, 2);
        }
    }

    let original: f64 = group.iter().map(|&t| f64::from(facets[t].area)).sum();
    let rebuilt: f64 = triangles_2d.iter().map(|&t| signed_area(&ring, t)).sum();
    if (original - rebuilt).abs() > 1e-3 * original.max(1e-9) {
        return Err(RepairFailure::AreaMismatch { original, rebuilt });
    }

    Ok(Patch {
        normal,
        corners: projected.into_iter().map(|(i, _)| i).collect(),
        triangles: triangles_2d,
    })
}

/// Vertices on edges used by exactly one triangle of the group, matched
/// by quantized position, in first-seen order.
fn boundary_vertices(mesh: &Mesh, triangles: &[[usize; 3]], group: &[usize], tolerance: f32) -> Vec<usize> {
    let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
        tolerance
    } else {
        DEFAULT_WELD_TOLERANCE
    };
    let scale = tolerance.recip();
    let quantize = |p: &Point3<f32>| p.coords.map(|x| (x * scale).round() as i64);

    let mut canonical: HashMap<_, usize> = HashMap::new();
    let mut uses: HashMap<(usize, usize), u32> = HashMap::new();
    let mut edges = Vec::new();

    for &t in group {
        let ids = triangles[t].map(|i| *canonical.entry(quantize(&mesh.positions[i])).or_insert(i));
        for k in 0..3 {
            let (a, b) = (ids[k], ids[(k + 1) % 3]);
            if a == b {
                continue;
            }
            let edge = (a.min(b), a.max(b));
            let count = uses.entry(edge).or_insert(0);
            if *count == 0 {
                edges.push(edge);
            }
            *count += 1;
        }
    }

    let mut seen = HashSet::new();
    edges
        .into_iter()
        .filter(|edge| uses[edge] == 1)
        .flat_map(|(a, b)| [a, b])
        .filter(|&i| seen.insert(i))
        .collect()
}

/// Two unit vectors spanning the plane with normal `n`, with `u × v = n`.
fn plane_basis(n: &Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let helper = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = n.cross(&helper).normalize();
    let v = n.cross(&u);
    (u, v)
}

/// Triangulates the closed ring and keeps the faces inside it.
fn triangulate_ring(ring: &[[f64; 2]]) -> Result<Vec<[usize; 3]>, RepairFailure> {
    let mut cdt = ConstrainedDelaunayTriangulation::<CdtPoint<f64>>::new();
    let mut handles = Vec::with_capacity(ring.len());
    for &[x, y] in ring {
        let handle = cdt
            .insert(CdtPoint::new(x, y))
            .map_err(|e: InsertionError| RepairFailure::Triangulation(format!("insert: {e}")))?;
        handles.push(handle);
    }
    if cdt.num_vertices() != ring.len() {
        return Err(RepairFailure::Triangulation(
            "outline corners coincide in the plane".into(),
        ));
    }

    for k in 0..handles.len() {
        let _ = cdt.add_constraint_and_split(handles[k], handles[(k + 1) % handles.len()], |p| p);
    }
    // Splitting only adds vertices where the ring crosses itself.
    if cdt.num_vertices() != ring.len() {
        return Err(RepairFailure::Triangulation("outline crosses itself".into()));
    }

    let mut slot = vec![0; ring.len()];
    for (k, handle) in handles.iter().enumerate() {
        slot[handle.index()] = k;
    }

    let mut triangles = Vec::new();
    for face in cdt.inner_faces() {
        let corners = face.vertices().map(|vh| slot[vh.fix().index()]);
        let centroid = corners.iter().fold([0.0, 0.0], |acc, &k| {
            [acc[0] + ring[k][0] / 3.0, acc[1] + ring[k][1] / 3.0]
        });
        if ring_contains(ring, centroid) {
            triangles.push(corners);
        }
    }
    Ok(triangles)
}

/// Even-odd point-in-polygon test.
fn ring_contains(ring: &[[f64; 2]], p: [f64; 2]) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a[1] > p[1]) != (b[1] > p[1])
            && p[0] < (b[0] - a[0]) * (p[1] - a[1]) / (b[1] - a[1]) + a[0]
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn signed_area(ring: &[[f64; 2]], [a, b, c]: [usize; 3]) -> f64 {
    let (pa, pb, pc) = (ring[a], ring[b], ring[c]);
    0.5 * ((pb[0] - pa[0]) * (pc[1] - pa[1]) - (pc[0] - pa[0]) * (pb[1] - pa[1]))
}

/// Rebuilds the mesh with each patch emitted where its group's first
/// triangle was. Vertices nothing references any more are dropped.
fn splice(mesh: &Mesh, triangles: &[[usize; 3]], replaced: &[bool], mut patches: HashMap<usize, Patch>) -> Mesh {
    let mut out = Buffers {
        positions: Vec::new(),
        normals: Vec::new(),
        uvs: mesh.uvs.as_ref().map(|_| Vec::new()),
        indices: Vec::with_capacity(3 * triangles.len()),
    };
    let mut remap: HashMap<usize, u32> = HashMap::new();

    for (t, corners) in triangles.iter().enumerate() {
        if let Some(patch) = patches.remove(&t) {
            let base: Vec<u32> = patch
                .corners
                .iter()
                .map(|&source| out.push_vertex(mesh, source, patch.normal))
                .collect();
            for tri in &patch.triangles {
                out.indices.extend(tri.map(|k| base[k]));
            }
        } else if !replaced[t] {
            for &i in corners {
                let index = *remap
                    .entry(i)
                    .or_insert_with(|| out.push_vertex(mesh, i, mesh.normals[i]));
                out.indices.push(index);
            }
        }
    }

    let mut rebuilt = Mesh {
        positions: out.positions,
        normals: out.normals,
        uvs: out.uvs,
        indices: Some(out.indices),
        bounds: None,
    };
    rebuilt.compute_bounds();
    rebuilt
}
