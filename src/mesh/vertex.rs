//! Struct and functions for working with `Vertex`s and their normal-weight
//! attribute.

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// Determines how a vertex normal is calculated as the weighted average of
/// adjacent face normals.
///
/// Persisted on the mesh as a small-int attribute; see [`Self::to_attr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexNormalWeight {
    /// Face normals are averaged evenly.
    Uniform,
    /// Face normals are averaged according to the corner angle of the shared
    /// vertex in each face.
    #[default]
    CornerAngle,
    /// Face normals are averaged according to the area of each face.
    FaceArea,
    /// Face normals are averaged according to both corner angle and face area.
    Combined,
    /// Face normals are not averaged; the vertex's stored normal is fixed.
    Unweighted,
}

impl VertexNormalWeight {
    /// Small-int encoding used for mesh-attached attribute storage.
    pub const fn to_attr(self) -> i8 {
        match self {
            VertexNormalWeight::Uniform => -1,
            VertexNormalWeight::CornerAngle => 0,
            VertexNormalWeight::FaceArea => 1,
            VertexNormalWeight::Combined => 2,
            VertexNormalWeight::Unweighted => 3,
        }
    }

    /// Decode the attribute encoding; unknown values fall back to the default.
    pub const fn from_attr(value: i8) -> Self {
        match value {
            -1 => VertexNormalWeight::Uniform,
            1 => VertexNormalWeight::FaceArea,
            2 => VertexNormalWeight::Combined,
            3 => VertexNormalWeight::Unweighted,
            _ => VertexNormalWeight::CornerAngle,
        }
    }
}

/// A mesh vertex: position plus the per-vertex normal configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub pos: Point3<Real>,

    /// How this vertex's normal is averaged from incident face normals.
    pub weight: VertexNormalWeight,

    /// Custom normal, present once computed or manually set. Used verbatim
    /// for every loop of the vertex while `weight` is
    /// [`VertexNormalWeight::Unweighted`].
    pub stored_normal: Option<Vector3<Real>>,
}

impl Vertex {
    /// Create a new [`Vertex`] at `pos` with the default weight type.
    /// Non-finite position components are sanitised to zero.
    pub fn new(mut pos: Point3<Real>) -> Self {
        for c in pos.coords.iter_mut() {
            if !c.is_finite() {
                *c = 0.0;
            }
        }

        Vertex {
            pos,
            weight: VertexNormalWeight::default(),
            stored_normal: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_round_trip() {
        for weight in [
            VertexNormalWeight::Uniform,
            VertexNormalWeight::CornerAngle,
            VertexNormalWeight::FaceArea,
            VertexNormalWeight::Combined,
            VertexNormalWeight::Unweighted,
        ] {
            assert_eq!(VertexNormalWeight::from_attr(weight.to_attr()), weight);
        }
        assert_eq!(
            VertexNormalWeight::from_attr(42),
            VertexNormalWeight::CornerAngle
        );
    }

    #[test]
    fn non_finite_position_is_sanitised() {
        let v = Vertex::new(Point3::new(Real::NAN, 1.0, Real::INFINITY));
        assert_eq!(v.pos, Point3::new(0.0, 1.0, 0.0));
    }
}
