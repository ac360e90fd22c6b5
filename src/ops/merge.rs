//! Merge operator: average the normals of vertices within a merge distance
//! of each other and freeze them, without moving any geometry.

use crate::engine::{self, UpdateOptions, UpdateReport};
use crate::errors::NormalResult;
use crate::float_types::{Real, tolerance};
use crate::mesh::{Mesh, VertexNormalWeight};
use crate::ops::Selection;
use hashbrown::{HashMap, HashSet};
use nalgebra::Vector3;
use tracing::warn;

/// Options for [`merge_normals`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    /// Maximum allowed distance between merged vertex normals. Zero is
    /// clamped to the crate tolerance so coincident vertices still merge.
    pub distance: Real,
    /// Also merge unselected vertices within distance of a selected one.
    pub include_unselected: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        MergeOptions {
            distance: 1e-4,
            include_unselected: false,
        }
    }
}

/// Outcome of a merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Vertices that received a merged normal.
    pub merged_vertices: usize,
    /// Groups whose contributions cancelled exactly; left unchanged.
    pub degenerate_groups: usize,
    /// Report of the update pass run after merging.
    pub update: UpdateReport,
}

/// Average normals across groups of nearby selected vertices and assign the
/// result uniformly, switching the group to
/// [`VertexNormalWeight::Unweighted`].
///
/// Vertices are bucketed into a discrete grid of `distance`-sized cells;
/// each unprocessed selected vertex gathers candidates from its 27-cell
/// neighborhood and merges those within the true distance. A group whose
/// summed normal cancels exactly is skipped gracefully, never a
/// divide-by-zero.
pub fn merge_normals(
    mesh: &mut Mesh,
    selection: &Selection,
    options: &MergeOptions,
    update_options: &UpdateOptions,
) -> NormalResult<MergeReport> {
    let distance = options.distance.max(tolerance());
    let distance_squared = distance * distance;
    let mut report = MergeReport::default();

    // Organize candidate vertices into discrete space.
    let candidates: Vec<u32> = if options.include_unselected {
        (0..mesh.vertices.len() as u32).collect()
    } else {
        selection.sorted_vertices()
    };
    let mut cells: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for &vertex in &candidates {
        cells
            .entry(cell_key(mesh, vertex, distance))
            .or_default()
            .push(vertex);
    }

    let mut processed: HashSet<u32> = HashSet::new();
    for vertex in selection.sorted_vertices() {
        if processed.contains(&vertex) {
            continue;
        }
        processed.insert(vertex);

        // Gather the 27-cell neighborhood, then cut to the true distance.
        let (cx, cy, cz) = cell_key(mesh, vertex, distance);
        let pos = mesh.vertices[vertex as usize].pos;
        let mut mergeable: Vec<u32> = Vec::new();
        for i in cx - 1..=cx + 1 {
            for j in cy - 1..=cy + 1 {
                for k in cz - 1..=cz + 1 {
                    let Some(cell) = cells.get(&(i, j, k)) else {
                        continue;
                    };
                    mergeable.extend(cell.iter().copied().filter(|&v| {
                        (mesh.vertices[v as usize].pos - pos).norm_squared()
                            <= distance_squared
                    }));
                }
            }
        }
        mergeable.sort_unstable();

        // A lone vertex whose loop normals already agree has nothing to
        // merge.
        let split_count = distinct_loop_normal_count(mesh, vertex);
        if split_count <= 1 && mergeable.len() <= 1 {
            continue;
        }

        // Merged normal: sum of each member's own averaged normal.
        let mut merged = Vector3::zeros();
        for &v in &mergeable {
            merged += mesh.vertex_loop_normal_average(v);
        }
        let len = merged.norm();
        if len <= Real::EPSILON {
            warn!(vertex, "merge group normals cancel; group left unchanged");
            report.degenerate_groups += 1;
            processed.extend(mergeable.iter().copied().filter(|v| selection.vertices.contains(v)));
            continue;
        }
        let merged = merged / len;

        for &v in &mergeable {
            let vert = &mut mesh.vertices[v as usize];
            vert.weight = VertexNormalWeight::Unweighted;
            vert.stored_normal = Some(merged);
        }
        report.merged_vertices += mergeable.len();
        processed.extend(mergeable.iter().copied().filter(|v| selection.vertices.contains(v)));
    }

    report.update = engine::update_vertex_normals(mesh, update_options)?;
    Ok(report)
}

fn cell_key(mesh: &Mesh, vertex: u32, distance: Real) -> (i64, i64, i64) {
    let p = mesh.vertices[vertex as usize].pos;
    (
        (p.x / distance).floor() as i64,
        (p.y / distance).floor() as i64,
        (p.z / distance).floor() as i64,
    )
}

fn distinct_loop_normal_count(mesh: &Mesh, vertex: u32) -> usize {
    let mut distinct: Vec<Vector3<Real>> = Vec::new();
    for (loop_idx, l) in mesh.loops.iter().enumerate() {
        if l.vertex == vertex && !distinct.contains(&mesh.loop_normals[loop_idx]) {
            distinct.push(mesh.loop_normals[loop_idx]);
        }
    }
    distinct.len()
}
