//! Test support library
//! Provides mesh builders & helpers shared by the integration tests.
#![allow(dead_code)]

use nalgebra::{Point3, Vector3};
use splitnorm::float_types::Real;
use splitnorm::mesh::Mesh;

/// 2x2 quad grid flat in the XY plane; the center vertex is index 4 with
/// four incident faces.
pub fn flat_grid() -> Mesh {
    let positions = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 1.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
        Point3::new(1.0, 2.0, 0.0),
        Point3::new(2.0, 2.0, 0.0),
    ];
    Mesh::from_positions_faces(
        &positions,
        vec![
            vec![0, 1, 4, 3],
            vec![1, 2, 5, 4],
            vec![3, 4, 7, 6],
            vec![4, 5, 8, 7],
        ],
    )
    .expect("valid mesh")
}

/// Two unit quads sharing the edge between vertices 1 and 2 (along +Y),
/// with the second quad rotated about that edge so the dihedral angle
/// between the face normals is `angle_deg`. Face 0 lies in XY with normal
/// +Z; face 1's normal is (sin θ, 0, cos θ).
pub fn hinge(angle_deg: Real) -> Mesh {
    let theta = angle_deg.to_radians();
    let positions = [
        Point3::new(-1.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(-1.0, 1.0, 0.0),
        Point3::new(theta.cos(), 0.0, theta.sin()),
        Point3::new(theta.cos(), 1.0, theta.sin()),
    ];
    Mesh::from_positions_faces(&positions, vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2]])
        .expect("valid mesh")
}

/// Axis-aligned cube spanning [-1, 1]^3 as six outward-facing quads.
pub fn cube() -> Mesh {
    let positions = [
        Point3::new(-1.0, -1.0, -1.0),
        Point3::new(1.0, -1.0, -1.0),
        Point3::new(1.0, 1.0, -1.0),
        Point3::new(-1.0, 1.0, -1.0),
        Point3::new(-1.0, -1.0, 1.0),
        Point3::new(1.0, -1.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(-1.0, 1.0, 1.0),
    ];
    Mesh::from_positions_faces(
        &positions,
        vec![
            vec![0, 3, 2, 1], // bottom, -Z
            vec![4, 5, 6, 7], // top, +Z
            vec![0, 1, 5, 4], // front, -Y
            vec![2, 3, 7, 6], // back, +Y
            vec![0, 4, 7, 3], // left, -X
            vec![1, 2, 6, 5], // right, +X
        ],
    )
    .expect("valid mesh")
}

/// Open square pyramid: apex at vertex 0, four triangular sides, no base
/// face (base edges are boundary).
pub fn pyramid() -> Mesh {
    let positions = [
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(-1.0, -1.0, 0.0),
        Point3::new(1.0, -1.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(-1.0, 1.0, 0.0),
    ];
    Mesh::from_positions_faces(
        &positions,
        vec![vec![0, 1, 2], vec![0, 2, 3], vec![0, 3, 4], vec![0, 4, 1]],
    )
    .expect("valid mesh")
}

/// Loop normals of every loop sitting on `vertex`.
pub fn loop_normals_at(mesh: &Mesh, vertex: u32) -> Vec<Vector3<Real>> {
    mesh.loops
        .iter()
        .enumerate()
        .filter(|(_, l)| l.vertex == vertex)
        .map(|(i, _)| mesh.loop_normals[i])
        .collect()
}

/// Normalized sum, for building expected values in tests.
pub fn unit(v: Vector3<Real>) -> Vector3<Real> {
    v.normalize()
}
