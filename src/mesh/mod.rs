//! Index-based mesh arena: vertices, faces, and derived loops (face corners)
//! with integer cross references.
//!
//! The mesh owns the only state persisted across operations: vertex
//! positions and weight types, face influence types, stored custom normals,
//! explicitly flagged sharp edges, and the per-loop split normals written by
//! the assignment engine. Adjacency and smoothing fans are derived fresh at
//! the start of every pass and never cached across edits.

use crate::errors::{NormalError, NormalResult};
use crate::float_types::Real;
use hashbrown::HashSet;
use nalgebra::{Point3, Vector3};

pub mod face;
pub mod vertex;

pub use face::{Face, FaceNormalInfluence};
pub use vertex::{Vertex, VertexNormalWeight};

/// Canonical undirected edge key: smaller vertex index first.
#[inline]
pub const fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}

/// A face corner. Belongs to exactly one face and one vertex and carries the
/// final split normal written to `Mesh::loop_normals`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loop {
    /// Vertex this corner sits on.
    pub vertex: u32,
    /// Owning face.
    pub face: u32,
    /// Position of `vertex` within the owning face's index list.
    pub corner: u32,
}

/// Polygon mesh with split-normal storage.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,

    /// Derived corners, contiguous per face in face order.
    pub loops: Vec<Loop>,

    /// Per-loop split normals, indexed like `loops`. Initialised to the
    /// owning face's normal (flat shading) until a pass or operator writes
    /// them.
    pub loop_normals: Vec<Vector3<Real>>,

    /// Explicitly flagged sharp edges, canonical `(min, max)` keys.
    pub sharp_edges: HashSet<(u32, u32)>,

    /// Loop index range start per face, with a trailing total; face `f`'s
    /// loops are `loop_offsets[f]..loop_offsets[f + 1]`.
    loop_offsets: Vec<u32>,
}

impl Mesh {
    /// Build a mesh from raw positions and per-face vertex index lists.
    ///
    /// Validates topology up front: every face needs at least 3 vertices and
    /// in-range indices, otherwise the offending face index is surfaced via
    /// [`NormalError::InvalidTopology`].
    pub fn from_positions_faces(
        positions: &[Point3<Real>],
        face_indices: Vec<Vec<u32>>,
    ) -> NormalResult<Self> {
        let vertices: Vec<Vertex> = positions.iter().map(|&p| Vertex::new(p)).collect();

        for (face_idx, indices) in face_indices.iter().enumerate() {
            if indices.len() < 3 {
                return Err(NormalError::InvalidTopology {
                    face: face_idx,
                    details: format!("face has {} vertices, need at least 3", indices.len()),
                });
            }
            if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
                return Err(NormalError::InvalidTopology {
                    face: face_idx,
                    details: format!(
                        "vertex index {} out of range (vertex count {})",
                        bad,
                        vertices.len()
                    ),
                });
            }
        }

        let faces: Vec<Face> = face_indices
            .into_iter()
            .map(|indices| Face::new(indices, &vertices))
            .collect();

        let mut loops = Vec::new();
        let mut loop_normals = Vec::new();
        let mut loop_offsets = Vec::with_capacity(faces.len() + 1);
        for (face_idx, face) in faces.iter().enumerate() {
            loop_offsets.push(loops.len() as u32);
            for (corner, &vertex) in face.indices.iter().enumerate() {
                loops.push(Loop {
                    vertex,
                    face: face_idx as u32,
                    corner: corner as u32,
                });
                loop_normals.push(face.normal);
            }
        }
        loop_offsets.push(loops.len() as u32);

        Ok(Mesh {
            vertices,
            faces,
            loops,
            loop_normals,
            sharp_edges: HashSet::new(),
            loop_offsets,
        })
    }

    /// Loop index range of a face.
    pub fn face_loops(&self, face: u32) -> std::ops::Range<usize> {
        self.loop_offsets[face as usize] as usize..self.loop_offsets[face as usize + 1] as usize
    }

    /// Positions of a face's corners, in winding order.
    pub fn face_points(&self, face: u32) -> Vec<Point3<Real>> {
        self.faces[face as usize]
            .indices
            .iter()
            .map(|&i| self.vertices[i as usize].pos)
            .collect()
    }

    /// Flag an edge as sharp regardless of auto-smooth settings.
    pub fn mark_sharp(&mut self, a: u32, b: u32) {
        self.sharp_edges.insert(edge_key(a, b));
    }

    /// Remove an explicit sharp flag.
    pub fn clear_sharp(&mut self, a: u32, b: u32) {
        self.sharp_edges.remove(&edge_key(a, b));
    }

    /// Whether an edge carries an explicit sharp flag.
    pub fn is_sharp_flagged(&self, a: u32, b: u32) -> bool {
        self.sharp_edges.contains(&edge_key(a, b))
    }

    /// Vertices currently assigned the given weight type.
    pub fn vertices_with_weight(&self, weight: VertexNormalWeight) -> Vec<u32> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.weight == weight)
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Faces currently assigned the given influence tier.
    pub fn faces_with_influence(&self, influence: FaceNormalInfluence) -> Vec<u32> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.influence == influence)
            .map(|(i, _)| i as u32)
            .collect()
    }

    /// Average of the current split normals over a vertex's loops,
    /// normalized. Zero if the vertex has no loops or the sum cancels.
    pub fn vertex_loop_normal_average(&self, vertex: u32) -> Vector3<Real> {
        let mut n = Vector3::zeros();
        for (loop_idx, l) in self.loops.iter().enumerate() {
            if l.vertex == vertex {
                n += self.loop_normals[loop_idx];
            }
        }
        let len = n.norm();
        if len <= Real::EPSILON {
            Vector3::zeros()
        } else {
            n / len
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_quads() -> Mesh {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
        ];
        Mesh::from_positions_faces(&positions, vec![vec![0, 1, 4, 3], vec![1, 2, 5, 4]])
            .expect("valid mesh")
    }

    #[test]
    fn loops_are_contiguous_per_face() {
        let mesh = two_quads();
        assert_eq!(mesh.loops.len(), 8);
        assert_eq!(mesh.face_loops(0), 0..4);
        assert_eq!(mesh.face_loops(1), 4..8);
        for idx in mesh.face_loops(1) {
            assert_eq!(mesh.loops[idx].face, 1);
        }
    }

    #[test]
    fn loop_normals_default_to_face_normal() {
        let mesh = two_quads();
        for n in &mesh.loop_normals {
            assert!((n - Vector3::z()).norm() < 1e-12);
        }
    }

    #[test]
    fn short_face_is_rejected() {
        let positions = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let err = Mesh::from_positions_faces(&positions, vec![vec![0, 1]]).unwrap_err();
        assert!(matches!(err, NormalError::InvalidTopology { face: 0, .. }));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let err =
            Mesh::from_positions_faces(&positions, vec![vec![0, 1, 2], vec![0, 1, 9]]).unwrap_err();
        assert!(matches!(err, NormalError::InvalidTopology { face: 1, .. }));
    }

    #[test]
    fn sharp_flag_is_canonical() {
        let mut mesh = two_quads();
        mesh.mark_sharp(4, 1);
        assert!(mesh.is_sharp_flagged(1, 4));
        mesh.clear_sharp(1, 4);
        assert!(!mesh.is_sharp_flagged(4, 1));
    }
}
