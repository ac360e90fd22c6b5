//! Mesh topology queries via adjacency structures, plus derived edge
//! sharpness.
//!
//! Everything here is transient: built in one traversal over the faces at
//! the start of a pass, dropped when the pass ends.

use crate::errors::{NormalError, NormalResult};
use crate::float_types::{ANGLE_EPSILON, Real};
use crate::geometry;
use crate::mesh::{Mesh, edge_key};
use hashbrown::{HashMap, HashSet};

/// Vertex→loops, vertex→faces, and edge→faces mappings.
///
/// Vertex-keyed maps are dense index arrays; edge keys are canonical
/// `(min, max)` pairs.
#[derive(Debug, Clone)]
pub struct MeshAdjacency {
    /// Loop indices incident to each vertex, ascending.
    pub vertex_loops: Vec<Vec<u32>>,

    /// Face indices incident to each vertex, ascending, deduplicated.
    pub vertex_faces: Vec<Vec<u32>>,

    /// Face indices sharing each edge.
    pub edge_faces: HashMap<(u32, u32), Vec<u32>>,
}

impl MeshAdjacency {
    /// Build all three mappings in a single O(loop count) traversal.
    ///
    /// Re-validates face topology so a mesh mutated into an invalid state
    /// after construction still fails with the offending face index.
    pub fn build(mesh: &Mesh) -> NormalResult<Self> {
        let mut vertex_loops = vec![Vec::new(); mesh.vertices.len()];
        let mut vertex_faces = vec![Vec::new(); mesh.vertices.len()];
        let mut edge_faces: HashMap<(u32, u32), Vec<u32>> = HashMap::new();

        for (face_idx, face) in mesh.faces.iter().enumerate() {
            if face.indices.len() < 3 {
                return Err(NormalError::InvalidTopology {
                    face: face_idx,
                    details: format!("face has {} vertices, need at least 3", face.indices.len()),
                });
            }
            if let Some(&bad) = face.indices.iter().find(|&&i| i as usize >= mesh.vertices.len()) {
                return Err(NormalError::InvalidTopology {
                    face: face_idx,
                    details: format!(
                        "vertex index {} out of range (vertex count {})",
                        bad,
                        mesh.vertices.len()
                    ),
                });
            }

            let face_idx = face_idx as u32;
            for (a, b) in face.edges() {
                edge_faces.entry(edge_key(a, b)).or_default().push(face_idx);
            }
            for &v in &face.indices {
                let faces = &mut vertex_faces[v as usize];
                if faces.last() != Some(&face_idx) {
                    faces.push(face_idx);
                }
            }
        }

        for (loop_idx, l) in mesh.loops.iter().enumerate() {
            vertex_loops[l.vertex as usize].push(loop_idx as u32);
        }

        Ok(MeshAdjacency {
            vertex_loops,
            vertex_faces,
            edge_faces,
        })
    }

    /// Faces adjacent to an edge, in either vertex order.
    pub fn faces_for_edge(&self, a: u32, b: u32) -> &[u32] {
        self.edge_faces
            .get(&edge_key(a, b))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// An edge is manifold when shared by exactly two faces.
    pub fn is_manifold_edge(&self, a: u32, b: u32) -> bool {
        self.faces_for_edge(a, b).len() == 2
    }
}

/// Derived sharpness for every edge of a mesh, per the active auto-smooth
/// settings.
///
/// An edge is sharp when any of these holds:
/// - it carries an explicit sharp flag,
/// - auto smooth is on and the dihedral angle between its two incident
///   faces meets the threshold (inclusive),
/// - it is a boundary edge (one incident face) or non-manifold (more than
///   two incident faces).
#[derive(Debug, Clone)]
pub struct EdgeSharpness {
    sharp: HashSet<(u32, u32)>,
}

impl EdgeSharpness {
    /// Classify every edge. `auto_smooth_angle` is in radians.
    pub fn derive(
        mesh: &Mesh,
        adjacency: &MeshAdjacency,
        auto_smooth: bool,
        auto_smooth_angle: Real,
    ) -> Self {
        let mut sharp = HashSet::new();

        for (&edge, faces) in &adjacency.edge_faces {
            if faces.len() != 2 {
                sharp.insert(edge);
                continue;
            }
            if mesh.sharp_edges.contains(&edge) {
                sharp.insert(edge);
                continue;
            }
            if auto_smooth {
                let n1 = &mesh.faces[faces[0] as usize].normal;
                let n2 = &mesh.faces[faces[1] as usize].normal;
                if geometry::normal_angle(n1, n2) + ANGLE_EPSILON >= auto_smooth_angle {
                    sharp.insert(edge);
                }
            }
        }

        EdgeSharpness { sharp }
    }

    pub fn is_sharp(&self, a: u32, b: u32) -> bool {
        self.sharp.contains(&edge_key(a, b))
    }

    /// Number of sharp edges, for pass diagnostics.
    pub fn len(&self) -> usize {
        self.sharp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sharp.is_empty()
    }
}
