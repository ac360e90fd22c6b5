//! Transfer Shading operator: interpolate split normals from a source
//! surface onto selected target vertices.
//!
//! The nearest-point lookup is the host's concern ([`ShadingSource`]); the
//! operator interpolates barycentrically over the returned face and freezes
//! the result. [`MeshShadingSource`] provides a brute-force in-crate source
//! for hosts without an accelerated query.

use crate::engine::{self, UpdateOptions, UpdateReport};
use crate::errors::{NormalError, NormalResult};
use crate::float_types::Real;
use crate::geometry;
use crate::mesh::{Mesh, VertexNormalWeight};
use crate::ops::Selection;
use nalgebra::{Point3, Vector3};
use tracing::debug;

/// A point on a source surface plus the containing face's corners, each
/// carrying its position and split normal.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSample {
    pub point: Point3<Real>,
    pub corners: Vec<(Point3<Real>, Vector3<Real>)>,
}

/// Nearest-point query over a source surface. Synchronous and CPU-bound.
pub trait ShadingSource {
    /// The surface sample nearest to `point`, or `None` for an empty
    /// source.
    fn nearest_sample(&self, point: &Point3<Real>) -> Option<SurfaceSample>;
}

/// Brute-force [`ShadingSource`] backed by a mesh: scans every face,
/// fan-triangulated, for the closest surface point.
pub struct MeshShadingSource<'a> {
    mesh: &'a Mesh,
}

impl<'a> MeshShadingSource<'a> {
    pub fn new(mesh: &'a Mesh) -> Self {
        MeshShadingSource { mesh }
    }
}

impl ShadingSource for MeshShadingSource<'_> {
    fn nearest_sample(&self, point: &Point3<Real>) -> Option<SurfaceSample> {
        let mut best: Option<(Real, u32, Point3<Real>)> = None;
        for face_idx in 0..self.mesh.faces.len() as u32 {
            let points = self.mesh.face_points(face_idx);
            for i in 1..points.len() - 1 {
                let q = geometry::closest_point_on_triangle(
                    point,
                    &points[0],
                    &points[i],
                    &points[i + 1],
                );
                let dist = (q - point).norm_squared();
                if best.is_none_or(|(d, _, _)| dist < d) {
                    best = Some((dist, face_idx, q));
                }
            }
        }

        best.map(|(_, face, q)| {
            let corners = self
                .mesh
                .face_loops(face)
                .map(|loop_idx| {
                    let l = self.mesh.loops[loop_idx];
                    (
                        self.mesh.vertices[l.vertex as usize].pos,
                        self.mesh.loop_normals[loop_idx],
                    )
                })
                .collect();
            SurfaceSample { point: q, corners }
        })
    }
}

/// Options for [`transfer_shading`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOptions {
    /// Vertices farther than this from their nearest source sample are left
    /// unmodified and reported.
    pub max_distance: Real,
}

impl Default for TransferOptions {
    fn default() -> Self {
        TransferOptions {
            max_distance: Real::MAX,
        }
    }
}

/// Outcome of a transfer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferReport {
    /// Vertices that received an interpolated normal.
    pub transferred: usize,
    /// Per-vertex misses ([`NormalError::EmptyTarget`]); those vertices were
    /// left unmodified.
    pub missed: Vec<NormalError>,
    /// Report of the update pass run after transferring.
    pub update: UpdateReport,
}

/// For each selected vertex, interpolate the source's split normal at the
/// nearest surface point and assign it, switching the vertex to
/// [`VertexNormalWeight::Unweighted`].
///
/// Unreachable vertices are skipped and reported; the rest proceed.
pub fn transfer_shading(
    mesh: &mut Mesh,
    selection: &Selection,
    source: &impl ShadingSource,
    options: &TransferOptions,
    update_options: &UpdateOptions,
) -> NormalResult<TransferReport> {
    let mut report = TransferReport::default();

    for vertex in selection.sorted_vertices() {
        let pos = mesh.vertices[vertex as usize].pos;
        let sample = source
            .nearest_sample(&pos)
            .filter(|s| (s.point - pos).norm() <= options.max_distance)
            .filter(|s| !s.corners.is_empty());
        let Some(sample) = sample else {
            report.missed.push(NormalError::EmptyTarget { vertex });
            continue;
        };

        let normal = interpolate_sample(&sample);
        let vert = &mut mesh.vertices[vertex as usize];
        vert.weight = VertexNormalWeight::Unweighted;
        vert.stored_normal = Some(normal);
        report.transferred += 1;
    }

    if !report.missed.is_empty() {
        debug!(
            missed = report.missed.len(),
            "transfer shading left unreachable vertices unmodified"
        );
    }

    report.update = engine::update_vertex_normals(mesh, update_options)?;
    Ok(report)
}

/// Barycentric interpolation of the sample's corner normals at the sample
/// point. For faces with more than three corners, the fan triangle nearest
/// the point supplies the coordinates.
fn interpolate_sample(sample: &SurfaceSample) -> Vector3<Real> {
    let corners = &sample.corners;
    if corners.len() == 1 {
        return corners[0].1;
    }
    if corners.len() == 2 {
        // Degenerate face; blend along the edge.
        let (a, na) = corners[0];
        let (b, nb) = corners[1];
        let ab = b - a;
        let t = if ab.norm_squared() <= Real::EPSILON {
            0.0
        } else {
            ((sample.point - a).dot(&ab) / ab.norm_squared()).clamp(0.0, 1.0)
        };
        return blend(&[(na, 1.0 - t), (nb, t)], &na);
    }

    let mut best: Option<(Real, [usize; 3])> = None;
    for i in 1..corners.len() - 1 {
        let tri = [0, i, i + 1];
        let q = geometry::closest_point_on_triangle(
            &sample.point,
            &corners[tri[0]].0,
            &corners[tri[1]].0,
            &corners[tri[2]].0,
        );
        let dist = (q - sample.point).norm_squared();
        if best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, tri));
        }
    }
    let (_, tri) = best.expect("at least one fan triangle");

    let bc = geometry::barycentric(
        &sample.point,
        &corners[tri[0]].0,
        &corners[tri[1]].0,
        &corners[tri[2]].0,
    );
    blend(
        &[
            (corners[tri[0]].1, bc[0]),
            (corners[tri[1]].1, bc[1]),
            (corners[tri[2]].1, bc[2]),
        ],
        &corners[tri[0]].1,
    )
}

/// Normalized weighted blend with a fallback for exact cancellation.
fn blend(weighted: &[(Vector3<Real>, Real)], fallback: &Vector3<Real>) -> Vector3<Real> {
    let sum: Vector3<Real> = weighted.iter().map(|(n, w)| n * *w).sum();
    let len = sum.norm();
    if len <= Real::EPSILON {
        *fallback
    } else {
        sum / len
    }
}
