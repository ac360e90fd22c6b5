//! Normal assignment engine: the full "update vertex normals" pass.
//!
//! Orchestrates adjacency → sharpness → fans → weighting, then writes every
//! loop normal back in a single batch. All derived state is rebuilt from the
//! mesh each call, so the pass is idempotent: repeating it with unchanged
//! inputs produces bit-identical output.

use crate::adjacency::{EdgeSharpness, MeshAdjacency};
use crate::errors::NormalResult;
use crate::fan;
use crate::float_types::Real;
use crate::mesh::{Mesh, VertexNormalWeight};
use crate::weights::{self, FanShading, LinkedAreas};
use nalgebra::Vector3;
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Explicit options for one update pass. No ambient configuration: hosts
/// pass this into every invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOptions {
    /// Mark edges sharp by dihedral angle.
    pub auto_smooth: bool,
    /// Auto-smooth threshold in degrees, 0–180. An edge exactly at the
    /// threshold is sharp.
    pub auto_smooth_angle_deg: Real,
    /// Replace per-face areas with summed areas of near-coplanar linked
    /// face groups when weighting by area.
    pub linked_face_weights: bool,
    /// Linked-group angle threshold in degrees.
    pub link_angle_deg: Real,
    /// Exempt fans of mutually coplanar faces from averaging; their loops
    /// keep flat face normals.
    pub flat_face_shading: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        UpdateOptions {
            auto_smooth: true,
            auto_smooth_angle_deg: 30.0,
            linked_face_weights: false,
            link_angle_deg: 0.0,
            flat_face_shading: false,
        }
    }
}

/// Outcome of one update pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Vertices whose weighted sum cancelled (or whose stored normal was
    /// missing) and received the fallback axis instead.
    pub fallback_vertices: Vec<u32>,
    /// Smoothing fans processed.
    pub fan_count: usize,
    /// Loop normals written.
    pub loops_written: usize,
}

/// Per-vertex result of the parallel map phase; applied in the batch write.
struct VertexShading {
    writes: Vec<(u32, Vector3<Real>)>,
    fans: usize,
    fallback: bool,
}

/// Recalculate every loop's split normal from current mesh state.
///
/// The mesh is read through a consistent snapshot (adjacency, sharpness,
/// linked areas) and mutated only in the final batch write, so a failed
/// pass leaves it untouched. Per-vertex work is independent; with the
/// `parallel` feature it runs as a rayon map with identical results.
pub fn update_vertex_normals(
    mesh: &mut Mesh,
    options: &UpdateOptions,
) -> NormalResult<UpdateReport> {
    let adjacency = MeshAdjacency::build(mesh)?;
    let sharpness = EdgeSharpness::derive(
        mesh,
        &adjacency,
        options.auto_smooth,
        options.auto_smooth_angle_deg.to_radians(),
    );
    let linked = options
        .linked_face_weights
        .then(|| LinkedAreas::compute(mesh, &adjacency, options.link_angle_deg.to_radians()));

    let shadings = shade_vertices(mesh, &adjacency, &sharpness, linked.as_ref(), options);

    let mut report = UpdateReport::default();
    for (vertex, shading) in shadings.into_iter().enumerate() {
        report.fan_count += shading.fans;
        report.loops_written += shading.writes.len();
        if shading.fallback {
            report.fallback_vertices.push(vertex as u32);
        }
        for (loop_idx, normal) in shading.writes {
            mesh.loop_normals[loop_idx as usize] = normal;
        }
    }

    if !report.fallback_vertices.is_empty() {
        warn!(
            vertices = ?report.fallback_vertices,
            "degenerate normal sums recovered with fallback axis"
        );
    }
    debug!(
        fans = report.fan_count,
        loops = report.loops_written,
        sharp_edges = sharpness.len(),
        "vertex normal pass complete"
    );

    Ok(report)
}

#[cfg(not(feature = "parallel"))]
fn shade_vertices(
    mesh: &Mesh,
    adjacency: &MeshAdjacency,
    sharpness: &EdgeSharpness,
    linked: Option<&LinkedAreas>,
    options: &UpdateOptions,
) -> Vec<VertexShading> {
    (0..mesh.vertices.len() as u32)
        .map(|v| shade_vertex(mesh, adjacency, sharpness, linked, options, v))
        .collect()
}

#[cfg(feature = "parallel")]
fn shade_vertices(
    mesh: &Mesh,
    adjacency: &MeshAdjacency,
    sharpness: &EdgeSharpness,
    linked: Option<&LinkedAreas>,
    options: &UpdateOptions,
) -> Vec<VertexShading> {
    (0..mesh.vertices.len() as u32)
        .into_par_iter()
        .map(|v| shade_vertex(mesh, adjacency, sharpness, linked, options, v))
        .collect()
}

fn shade_vertex(
    mesh: &Mesh,
    adjacency: &MeshAdjacency,
    sharpness: &EdgeSharpness,
    linked: Option<&LinkedAreas>,
    options: &UpdateOptions,
    vertex: u32,
) -> VertexShading {
    let incident = &adjacency.vertex_loops[vertex as usize];
    let mut shading = VertexShading {
        writes: Vec::with_capacity(incident.len()),
        fans: 0,
        fallback: false,
    };
    if incident.is_empty() {
        return shading;
    }

    // Unweighted short-circuits the whole fan machinery: the stored normal
    // goes to every loop of the vertex, normalized at write time.
    if mesh.vertices[vertex as usize].weight == VertexNormalWeight::Unweighted {
        let stored = mesh.vertices[vertex as usize]
            .stored_normal
            .filter(|n| n.norm_squared() > Real::EPSILON);
        let normal = match stored {
            Some(n) => n.normalize(),
            None => {
                shading.fallback = true;
                weights::fallback_normal(mesh, incident)
            }
        };
        shading.fans = 1;
        shading
            .writes
            .extend(incident.iter().map(|&l| (l, normal)));
        return shading;
    }

    for fan in fan::vertex_fans(mesh, adjacency, sharpness, vertex) {
        shading.fans += 1;
        match weights::shade_fan(mesh, &fan, vertex, linked, options.flat_face_shading) {
            Ok(FanShading::Averaged(normal)) => {
                shading.writes.extend(fan.iter().map(|&l| (l, normal)));
            }
            Ok(FanShading::Flat) => {
                shading.writes.extend(fan.iter().map(|&l| {
                    let face = mesh.loops[l as usize].face;
                    (l, mesh.faces[face as usize].normal)
                }));
            }
            Err(err) => {
                debug!(%err, "recovering fan with fallback normal");
                shading.fallback = true;
                let normal = weights::fallback_normal(mesh, &fan);
                shading.writes.extend(fan.iter().map(|&l| (l, normal)));
            }
        }
    }

    shading
}
