//! A polygon **mesh topology** library with columnar element storage,
//! built around a [BMesh](bmesh) of vertices, edges, faces and loops whose
//! adjacency lives in typed attribute columns, plus a
//! [triangulation pass](triangulate) that turns the faces into a render-ready
//! index buffer.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **delaunay**: use `geo`s `spade` feature for a constrained Delaunay
//!   [`PolygonTriangulator`](traits::PolygonTriangulator); ear clipping
//!   through `geo`s `earcutr` feature is always available

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod bmesh;
pub mod data;
pub mod errors;
pub mod float_types;
pub mod normal;
pub mod planar;
pub mod traits;
pub mod triangulate;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use bmesh::{BMesh, Edge, Face, Loop, Vertex};
pub use data::{Attribute, Element, ElementPool};
pub use errors::{MeshError, TriangulationError};
pub use planar::PlanarCoordinateSystem;
pub use traits::{IndexBufferSink, PolygonTriangulator};
pub use triangulate::{EarcutTriangulator, Triangle, TriangleIndices};
