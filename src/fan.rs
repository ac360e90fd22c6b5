//! Smoothing fan builder: partitions the loops around a vertex into maximal
//! groups not separated by a sharp edge or an influence-exclusion boundary.
//!
//! Implemented as an iterative flood fill over the vertex's incident faces,
//! crossing only smooth manifold vertex-incident edges. Non-manifold edges
//! are always sharp, so vertices with ambiguous rotation order degrade to
//! grouping by plain sharp-edge adjacency, which is this same fill.

use crate::adjacency::{EdgeSharpness, MeshAdjacency};
use crate::mesh::{FaceNormalInfluence, Mesh};
use hashbrown::HashSet;

/// Partition `vertex`'s loops into smoothing fans.
///
/// Each fan is a sorted list of loop indices; fans are ordered by their
/// lowest member, so the output is deterministic for a given mesh state.
/// A vertex with a single incident face yields one singleton fan.
pub fn vertex_fans(
    mesh: &Mesh,
    adjacency: &MeshAdjacency,
    sharpness: &EdgeSharpness,
    vertex: u32,
) -> Vec<Vec<u32>> {
    let incident_loops = &adjacency.vertex_loops[vertex as usize];
    if incident_loops.is_empty() {
        return Vec::new();
    }

    // The vertex's maximum present influence tier decides which faces are
    // "included"; an edge between an included and an excluded face starts a
    // new fan just like a sharp edge does.
    let max_tier = vertex_max_tier(mesh, adjacency, vertex);
    let included =
        |face: u32| -> bool { mesh.faces[face as usize].influence == max_tier };

    let mut fans = Vec::new();
    let mut visited_faces: HashSet<u32> = HashSet::new();

    for &seed_loop in incident_loops {
        let seed_face = mesh.loops[seed_loop as usize].face;
        if visited_faces.contains(&seed_face) {
            continue;
        }

        // Flood fill faces reachable from the seed without crossing a sharp
        // edge or an inclusion boundary.
        let mut member_faces = vec![seed_face];
        visited_faces.insert(seed_face);
        let mut stack = vec![seed_face];
        while let Some(face) = stack.pop() {
            for (a, b) in mesh.faces[face as usize].edges() {
                if a != vertex && b != vertex {
                    continue;
                }
                if sharpness.is_sharp(a, b) || !adjacency.is_manifold_edge(a, b) {
                    continue;
                }
                for &neighbor in adjacency.faces_for_edge(a, b) {
                    if neighbor == face || visited_faces.contains(&neighbor) {
                        continue;
                    }
                    if included(neighbor) != included(face) {
                        continue;
                    }
                    visited_faces.insert(neighbor);
                    member_faces.push(neighbor);
                    stack.push(neighbor);
                }
            }
        }

        let mut fan: Vec<u32> = incident_loops
            .iter()
            .copied()
            .filter(|&l| member_faces.contains(&mesh.loops[l as usize].face))
            .collect();
        fan.sort_unstable();
        fans.push(fan);
    }

    fans
}

/// Highest influence tier present among a vertex's incident faces.
pub fn vertex_max_tier(
    mesh: &Mesh,
    adjacency: &MeshAdjacency,
    vertex: u32,
) -> FaceNormalInfluence {
    adjacency.vertex_faces[vertex as usize]
        .iter()
        .map(|&f| mesh.faces[f as usize].influence)
        .max()
        .unwrap_or_default()
}
