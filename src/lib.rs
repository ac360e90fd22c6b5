//! Split (per-corner) vertex normal computation and editing for polygon
//! meshes: weighted face-normal averaging, influence-tiered face filtering,
//! auto-smooth sharp edges, flat-face preservation, and manual edit
//! operators (get/set, merge, transfer shading). Shading control without
//! touching geometry.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **parallel**: use rayon to shade vertices concurrently; results are
//!   identical to the sequential path

#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod adjacency;
pub mod engine;
pub mod errors;
pub mod fan;
pub mod float_types;
pub mod geometry;
pub mod mesh;
pub mod ops;
pub mod weights;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use engine::{UpdateOptions, UpdateReport, update_vertex_normals};
pub use errors::{NormalError, NormalResult};
pub use mesh::{Face, FaceNormalInfluence, Mesh, Vertex, VertexNormalWeight};
pub use ops::{NormalPick, Selection};
