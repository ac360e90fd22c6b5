//! Weighted normal calculator: turns one smoothing fan into one normal (or
//! per-loop flat normals), honoring the vertex's weight type, the fan's
//! influence tiers, and the linked-face area grouping.

use crate::errors::{NormalError, NormalResult};
use crate::float_types::{ANGLE_EPSILON, Real, tolerance};
use crate::geometry;
use crate::adjacency::MeshAdjacency;
use crate::mesh::{Mesh, VertexNormalWeight};
use nalgebra::Vector3;

/// Per-face group areas for the Linked Face Weights option: each face's
/// weight becomes the summed area of every face reachable through manifold
/// edges whose face-normal angle stays within the link angle.
///
/// Computed once per pass over the whole mesh so the parallel per-vertex
/// phase reads it immutably.
#[derive(Debug, Clone)]
pub struct LinkedAreas {
    areas: Vec<Real>,
}

impl LinkedAreas {
    /// Flood-fill face groups and sum their areas. `link_angle` is in
    /// radians; zero groups only (numerically) coplanar neighbors.
    pub fn compute(mesh: &Mesh, adjacency: &MeshAdjacency, link_angle: Real) -> Self {
        let mut areas = vec![0.0; mesh.faces.len()];
        let mut group = vec![usize::MAX; mesh.faces.len()];

        for seed in 0..mesh.faces.len() {
            if group[seed] != usize::MAX {
                continue;
            }

            let mut members = vec![seed];
            group[seed] = seed;
            let mut stack = vec![seed];
            while let Some(face) = stack.pop() {
                for (a, b) in mesh.faces[face].edges() {
                    if !adjacency.is_manifold_edge(a, b) {
                        continue;
                    }
                    for &neighbor in adjacency.faces_for_edge(a, b) {
                        let neighbor = neighbor as usize;
                        if neighbor == face || group[neighbor] != usize::MAX {
                            continue;
                        }
                        let angle = geometry::normal_angle(
                            &mesh.faces[face].normal,
                            &mesh.faces[neighbor].normal,
                        );
                        if angle <= link_angle + ANGLE_EPSILON {
                            group[neighbor] = seed;
                            members.push(neighbor);
                            stack.push(neighbor);
                        }
                    }
                }
            }

            let group_area: Real = members.iter().map(|&f| mesh.faces[f].area).sum();
            for &f in &members {
                areas[f] = group_area;
            }
        }

        LinkedAreas { areas }
    }

    /// Group area for a face.
    pub fn area(&self, face: u32) -> Real {
        self.areas[face as usize]
    }
}

/// How the loops of one fan should be shaded.
#[derive(Debug, Clone, PartialEq)]
pub enum FanShading {
    /// Every loop in the fan receives this unit normal.
    Averaged(Vector3<Real>),
    /// Flat-face exemption: every loop keeps its own face normal.
    Flat,
}

/// Compute the shading for one fan of `vertex`.
///
/// Faces below the fan's maximum present influence tier contribute zero
/// weight. A weighted sum that collapses to the zero vector fails with
/// [`NormalError::DegenerateNormal`]; the caller recovers with a fallback
/// axis. Never divides by zero.
pub fn shade_fan(
    mesh: &Mesh,
    fan: &[u32],
    vertex: u32,
    linked: Option<&LinkedAreas>,
    flat_face_shading: bool,
) -> NormalResult<FanShading> {
    debug_assert!(!fan.is_empty());

    // Flat-face exemption: a fan of mutually coplanar faces keeps hard
    // shading without requiring explicit sharp edges.
    if flat_face_shading && fan_is_flat(mesh, fan) {
        return Ok(FanShading::Flat);
    }

    let max_tier = fan
        .iter()
        .map(|&l| mesh.faces[mesh.loops[l as usize].face as usize].influence)
        .max()
        .unwrap_or_default();

    let weight_type = mesh.vertices[vertex as usize].weight;
    let mut sum = Vector3::zeros();
    for &loop_idx in fan {
        let l = mesh.loops[loop_idx as usize];
        let face = &mesh.faces[l.face as usize];
        if face.influence != max_tier {
            continue;
        }

        let weight = match weight_type {
            VertexNormalWeight::Uniform => 1.0,
            VertexNormalWeight::CornerAngle => corner_angle_at(mesh, loop_idx),
            VertexNormalWeight::FaceArea => face_weight_area(face.area, l.face, linked),
            VertexNormalWeight::Combined => {
                corner_angle_at(mesh, loop_idx) * face_weight_area(face.area, l.face, linked)
            }
            // Unweighted vertices never reach the calculator; the engine
            // writes their stored normal directly.
            VertexNormalWeight::Unweighted => 0.0,
        };
        sum += face.normal * weight;
    }

    let len = sum.norm();
    if len <= Real::EPSILON {
        return Err(NormalError::DegenerateNormal { vertex });
    }
    Ok(FanShading::Averaged(sum / len))
}

/// Fallback normal when a fan's weighted sum cancels: the first member
/// face's non-degenerate normal, else +Z.
pub fn fallback_normal(mesh: &Mesh, fan: &[u32]) -> Vector3<Real> {
    fan.iter()
        .map(|&l| mesh.faces[mesh.loops[l as usize].face as usize].normal)
        .find(|n| n.norm_squared() > Real::EPSILON)
        .unwrap_or_else(Vector3::z)
}

fn fan_is_flat(mesh: &Mesh, fan: &[u32]) -> bool {
    let flat_angle = tolerance().max(ANGLE_EPSILON);
    for (i, &a) in fan.iter().enumerate() {
        let na = &mesh.faces[mesh.loops[a as usize].face as usize].normal;
        for &b in &fan[i + 1..] {
            let nb = &mesh.faces[mesh.loops[b as usize].face as usize].normal;
            if geometry::normal_angle(na, nb) > flat_angle {
                return false;
            }
        }
    }
    true
}

fn face_weight_area(area: Real, face: u32, linked: Option<&LinkedAreas>) -> Real {
    match linked {
        Some(linked) => linked.area(face),
        None => area,
    }
}

/// Interior angle subtended at the loop's vertex by its face.
fn corner_angle_at(mesh: &Mesh, loop_idx: u32) -> Real {
    let l = mesh.loops[loop_idx as usize];
    let indices = &mesh.faces[l.face as usize].indices;
    let n = indices.len();
    let corner = l.corner as usize;
    let prev = indices[(corner + n - 1) % n] as usize;
    let next = indices[(corner + 1) % n] as usize;
    geometry::corner_angle(
        &mesh.vertices[prev].pos,
        &mesh.vertices[l.vertex as usize].pos,
        &mesh.vertices[next].pos,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::MeshAdjacency;
    use crate::mesh::FaceNormalInfluence;
    use nalgebra::Point3;

    fn triangle() -> Mesh {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        Mesh::from_positions_faces(&positions, vec![vec![0, 1, 2]]).expect("valid mesh")
    }

    #[test]
    fn single_face_fan_equals_face_normal() {
        let mesh = triangle();
        for weight in [
            VertexNormalWeight::Uniform,
            VertexNormalWeight::CornerAngle,
            VertexNormalWeight::FaceArea,
            VertexNormalWeight::Combined,
        ] {
            let mut mesh = mesh.clone();
            mesh.vertices[0].weight = weight;
            let shading = shade_fan(&mesh, &[0], 0, None, false).expect("non-degenerate");
            assert_eq!(shading, FanShading::Averaged(Vector3::z()));
        }
    }

    #[test]
    fn cancelling_normals_are_degenerate_not_nan() {
        // Two coplanar quads, the second wound backwards: normals +Z and -Z.
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let mut mesh = Mesh::from_positions_faces(
            &positions,
            vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2].into_iter().rev().collect()],
        )
        .expect("valid mesh");
        mesh.vertices[1].weight = VertexNormalWeight::Uniform;

        // Loops of vertex 1: one in each face.
        let fan: Vec<u32> = mesh
            .loops
            .iter()
            .enumerate()
            .filter(|(_, l)| l.vertex == 1)
            .map(|(i, _)| i as u32)
            .collect();
        let err = shade_fan(&mesh, &fan, 1, None, false).unwrap_err();
        assert_eq!(err, NormalError::DegenerateNormal { vertex: 1 });
        assert_eq!(fallback_normal(&mesh, &fan), Vector3::z());
    }

    #[test]
    fn lower_tier_contributes_zero_weight() {
        // Roof: two quads at a dihedral, one Strong and one Weak.
        let positions = [
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(-1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let mut mesh = Mesh::from_positions_faces(
            &positions,
            vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2]],
        )
        .expect("valid mesh");
        mesh.faces[0].influence = FaceNormalInfluence::Strong;
        mesh.faces[1].influence = FaceNormalInfluence::Weak;
        mesh.vertices[1].weight = VertexNormalWeight::Uniform;

        let fan: Vec<u32> = mesh
            .loops
            .iter()
            .enumerate()
            .filter(|(_, l)| l.vertex == 1)
            .map(|(i, _)| i as u32)
            .collect();
        let shading = shade_fan(&mesh, &fan, 1, None, false).expect("non-degenerate");
        assert_eq!(shading, FanShading::Averaged(mesh.faces[0].normal));
    }

    #[test]
    fn coplanar_fan_is_exempted_when_flat_shading_is_on() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        let mesh = Mesh::from_positions_faces(
            &positions,
            vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]],
        )
        .expect("valid mesh");

        let fan: Vec<u32> = mesh
            .loops
            .iter()
            .enumerate()
            .filter(|(_, l)| l.vertex == 1)
            .map(|(i, _)| i as u32)
            .collect();

        let flat = shade_fan(&mesh, &fan, 1, None, true).expect("non-degenerate");
        assert_eq!(flat, FanShading::Flat);
        let averaged = shade_fan(&mesh, &fan, 1, None, false).expect("non-degenerate");
        assert!(matches!(averaged, FanShading::Averaged(_)));
    }

    #[test]
    fn linked_areas_group_coplanar_strips() {
        // Three quads in a row; the first two coplanar, the third tilted up.
        let lift = 1.0;
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, lift),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(3.0, 1.0, lift),
        ];
        let mesh = Mesh::from_positions_faces(
            &positions,
            vec![vec![0, 1, 5, 4], vec![1, 2, 6, 5], vec![2, 3, 7, 6]],
        )
        .expect("valid mesh");
        let adjacency = MeshAdjacency::build(&mesh).expect("valid topology");
        let linked = LinkedAreas::compute(&mesh, &adjacency, 0.0);

        let flat_group = mesh.faces[0].area + mesh.faces[1].area;
        assert!((linked.area(0) - flat_group).abs() < 1e-9);
        assert!((linked.area(1) - flat_group).abs() < 1e-9);
        assert!((linked.area(2) - mesh.faces[2].area).abs() < 1e-9);
    }
}
