//! `Face` and the face normal influence attribute.

use crate::float_types::Real;
use crate::geometry;
use crate::mesh::vertex::Vertex;
use nalgebra::Vector3;

/// Determines which face normals participate in vertex normal calculations.
///
/// Strictly ordered: `Weak < Medium < Strong`. At each smoothing fan, only
/// faces at the maximum present tier contribute weight; the ordering leaves
/// no possibility of a tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum FaceNormalInfluence {
    /// Participates only if the fan contains no medium or strong face.
    Weak,
    /// Participates only if the fan contains no strong face.
    #[default]
    Medium,
    /// Always participates.
    Strong,
}

impl FaceNormalInfluence {
    /// Small-int encoding used for mesh-attached attribute storage.
    pub const fn to_attr(self) -> i8 {
        match self {
            FaceNormalInfluence::Weak => -1,
            FaceNormalInfluence::Medium => 0,
            FaceNormalInfluence::Strong => 1,
        }
    }

    /// Decode the attribute encoding; unknown values fall back to the default.
    pub const fn from_attr(value: i8) -> Self {
        match value {
            -1 => FaceNormalInfluence::Weak,
            1 => FaceNormalInfluence::Strong,
            _ => FaceNormalInfluence::Medium,
        }
    }
}

/// A polygonal face defined by indices into the mesh vertex array, with its
/// unit normal and area cached at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Ordered vertex indices, at least 3.
    pub indices: Vec<u32>,

    /// Cached unit normal (Newell). Zero for degenerate faces.
    pub normal: Vector3<Real>,

    /// Cached area. Zero for degenerate faces.
    pub area: Real,

    /// Which vertex normal calculations this face's normal participates in.
    pub influence: FaceNormalInfluence,
}

impl Face {
    /// Build a face over `indices`, caching normal and area from the given
    /// vertex arena. The caller is responsible for index validation.
    pub fn new(indices: Vec<u32>, vertices: &[Vertex]) -> Self {
        let points: Vec<_> = indices.iter().map(|&i| vertices[i as usize].pos).collect();
        let (normal, area) = geometry::face_normal_and_area(&points);

        Face {
            indices,
            normal,
            area,
            influence: FaceNormalInfluence::default(),
        }
    }

    /// Iterator over paired indices each forming an edge of the face.
    pub fn edges(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.indices
            .iter()
            .zip(self.indices.iter().cycle().skip(1))
            .map(|(&a, &b)| (a, b))
    }
}
