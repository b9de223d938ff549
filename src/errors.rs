//! Precondition and triangulation errors

use crate::bmesh::Vertex;
use crate::float_types::Real;
use thiserror::Error;

/// All the precondition violations the mesh structures can report.
///
/// These signal programmer error: malformed construction arguments are
/// rejected immediately instead of being coerced into something valid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// (DegenerateEdge) Both ends of an edge are the same vertex
    #[error("(DegenerateEdge) an edge needs two distinct vertices, got {0:?} twice")]
    DegenerateEdge(Vertex),
    /// (TooFewVertices) A face or polygon has fewer than the minimal #vertices
    #[error("(TooFewVertices) need at least {required} vertices, got {actual}")]
    TooFewVertices { required: usize, actual: usize },
    /// (StaleElement) The element was removed from its pool, or belongs to another pool
    #[error("(StaleElement) {kind} element is not alive in this pool")]
    StaleElement { kind: &'static str },
    /// (DuplicateAttribute) A column with this name is already registered
    #[error("(DuplicateAttribute) {pool} pool already has an attribute named '{name}'")]
    DuplicateAttribute { pool: &'static str, name: String },
    /// (StaleAttribute) The attribute handle does not refer to a live column of this pool
    #[error("(StaleAttribute) attribute is not registered on the {pool} pool")]
    StaleAttribute { pool: &'static str },
    /// (ReservedAttribute) Columns owned by the topology cannot be removed
    #[error("(ReservedAttribute) '{name}' is reserved by the {pool} pool")]
    ReservedAttribute { pool: &'static str, name: String },
    /// (InvalidAxis) A basis axis is not (close to) unit length, or could not be derived
    #[error("(InvalidAxis) invalid {axis} axis: squared length {length_squared} (normalized?)")]
    InvalidAxis { axis: char, length_squared: Real },
    /// (PointsTooClose) Two positions are closer than the minimum vertex distance
    #[error("(PointsTooClose) distance between points is too short (squared distance {distance_squared})")]
    PointsTooClose { distance_squared: Real },
    /// (DegeneratePolygon) A polygon has fewer than 3 distinguishable positions
    #[error("(DegeneratePolygon) cannot build a planar coordinate system from {valid} distinct positions")]
    DegeneratePolygon { valid: usize },
    /// (IndexOverflow) A render index does not fit into the selected index width
    #[error("(IndexOverflow) vertex index {index} does not fit the index format")]
    IndexOverflow { index: usize },
}

/// Failure reported by a polygon triangulator for one face.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TriangulationError {
    /// The polygon has fewer than 3 points
    #[error("polygon has {0} points, at least 3 are needed")]
    TooFewPoints(usize),
    /// A projected coordinate is NaN or infinite
    #[error("coordinate {index} is NaN or infinite")]
    InvalidCoordinate { index: usize },
    /// A produced triangle references a point outside the polygon
    #[error("triangle index {index} is out of range for {len} points")]
    IndexOutOfRange { index: usize, len: usize },
    /// The triangles do not cover the polygon, e.g. for self-intersecting outlines
    #[error("triangulation has {triangles} triangles, expected {expected}")]
    Incomplete { triangles: usize, expected: usize },
    /// A polygon point is not used by any triangle
    #[error("point {index} is not part of any triangle")]
    UnusedPoint { index: usize },
    /// The polygon could not be flattened into a plane
    #[error("polygon could not be projected: {0}")]
    Projection(#[from] MeshError),
    /// In general, anything else
    #[error("{0}")]
    Failed(String),
}
