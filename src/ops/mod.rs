//! Manual edit operators: Get, Set, and weight/influence attribute
//! management. Merge and Transfer Shading live in their own submodules.
//!
//! Operators take the current selection as an explicit input set; they never
//! query host UI state.

use crate::engine::{self, UpdateOptions, UpdateReport};
use crate::errors::{NormalError, NormalResult};
use crate::float_types::Real;
use crate::mesh::{FaceNormalInfluence, Mesh, VertexNormalWeight};
use hashbrown::HashSet;
use nalgebra::Vector3;

pub mod merge;
pub mod transfer;

pub use merge::{MergeOptions, MergeReport, merge_normals};
pub use transfer::{
    MeshShadingSource, ShadingSource, SurfaceSample, TransferOptions, TransferReport,
    transfer_shading,
};

/// The set of currently selected mesh elements, as reported by the host.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub vertices: HashSet<u32>,
    pub faces: HashSet<u32>,
}

impl Selection {
    pub fn from_vertices(vertices: impl IntoIterator<Item = u32>) -> Self {
        Selection {
            vertices: vertices.into_iter().collect(),
            faces: HashSet::new(),
        }
    }

    pub fn from_faces(faces: impl IntoIterator<Item = u32>) -> Self {
        Selection {
            vertices: HashSet::new(),
            faces: faces.into_iter().collect(),
        }
    }

    /// Selected vertices in ascending order, for deterministic iteration.
    pub fn sorted_vertices(&self) -> Vec<u32> {
        let mut vertices: Vec<u32> = self.vertices.iter().copied().collect();
        vertices.sort_unstable();
        vertices
    }
}

/// Result of [`get_normal`]: which kind of element the selection resolved
/// to, and the normal(s) read from it.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalPick {
    /// Exactly one face was selected; its normal.
    Face(Vector3<Real>),
    /// Exactly one vertex was selected. One entry per distinct split normal
    /// across the vertex's loops; the caller picks. Falls back to the stored
    /// normal for a vertex with no incident face, and may be empty.
    Vertex { candidates: Vec<Vector3<Real>> },
}

/// Read a normal from the selection without mutating the mesh.
///
/// One selected face wins over any vertex selection (a selected face drags
/// its corner vertices along in most hosts). Otherwise exactly one vertex
/// must be selected, or the call fails with
/// [`NormalError::AmbiguousSelection`].
pub fn get_normal(mesh: &Mesh, selection: &Selection) -> NormalResult<NormalPick> {
    if selection.faces.len() == 1 {
        let face = *selection.faces.iter().next().expect("len checked");
        return Ok(NormalPick::Face(mesh.faces[face as usize].normal));
    }

    if selection.vertices.len() == 1 {
        let vertex = *selection.vertices.iter().next().expect("len checked");
        let mut candidates: Vec<Vector3<Real>> = Vec::new();
        for (loop_idx, l) in mesh.loops.iter().enumerate() {
            if l.vertex != vertex {
                continue;
            }
            let n = mesh.loop_normals[loop_idx];
            if !candidates.contains(&n) {
                candidates.push(n);
            }
        }
        if candidates.is_empty() {
            if let Some(stored) = mesh.vertices[vertex as usize].stored_normal {
                candidates.push(stored);
            }
        }
        return Ok(NormalPick::Vertex { candidates });
    }

    Err(NormalError::AmbiguousSelection {
        vertices: selection.vertices.len(),
        faces: selection.faces.len(),
    })
}

/// Assign `normal` as the stored custom normal of every selected vertex,
/// switch those vertices to [`VertexNormalWeight::Unweighted`], and run an
/// update pass so their loops pick it up.
pub fn set_normal(
    mesh: &mut Mesh,
    selection: &Selection,
    normal: Vector3<Real>,
    options: &UpdateOptions,
) -> NormalResult<UpdateReport> {
    for &vertex in &selection.vertices {
        let v = &mut mesh.vertices[vertex as usize];
        v.weight = VertexNormalWeight::Unweighted;
        v.stored_normal = Some(normal);
    }
    engine::update_vertex_normals(mesh, options)
}

/// Assign a weight type to every selected vertex.
///
/// Switching to [`VertexNormalWeight::Unweighted`] captures each vertex's
/// current loop-normal average as its stored normal, freezing the shading
/// in place. Passes `update` through to an immediate recompute.
pub fn set_vertex_weights(
    mesh: &mut Mesh,
    selection: &Selection,
    weight: VertexNormalWeight,
    options: &UpdateOptions,
    update: bool,
) -> NormalResult<Option<UpdateReport>> {
    for &vertex in &selection.vertices {
        if weight == VertexNormalWeight::Unweighted {
            let average = mesh.vertex_loop_normal_average(vertex);
            if average.norm_squared() > Real::EPSILON {
                mesh.vertices[vertex as usize].stored_normal = Some(average);
            }
        }
        mesh.vertices[vertex as usize].weight = weight;
    }

    if update {
        engine::update_vertex_normals(mesh, options).map(Some)
    } else {
        Ok(None)
    }
}

/// Assign an influence tier to every selected face, optionally recomputing
/// immediately.
pub fn set_face_influences(
    mesh: &mut Mesh,
    selection: &Selection,
    influence: FaceNormalInfluence,
    options: &UpdateOptions,
    update: bool,
) -> NormalResult<Option<UpdateReport>> {
    for &face in &selection.faces {
        mesh.faces[face as usize].influence = influence;
    }

    if update {
        engine::update_vertex_normals(mesh, options).map(Some)
    } else {
        Ok(None)
    }
}
