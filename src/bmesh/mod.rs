//! BMesh: vertices, edges, faces and loops stored in element pools
//!
//! The topology itself lives in reserved attribute columns:
//!
//! - every [`Vertex`] references one incident [`Edge`]; the edges around a
//!   vertex form a singly linked *disk* cycle,
//! - every [`Edge`] references its two vertices and one incident [`Loop`];
//!   the loops sharing an edge form a *radial* cycle of any length, so edges
//!   used by more than two faces are supported,
//! - every [`Face`] references its starting [`Loop`]; the loops of a face form
//!   a cycle through `next` that visits the face's vertices in order.

use crate::data::{
    Element, ElementAttribute, ElementPool, ElementTupleAttribute, PointAttribute,
    element_handle,
};
use crate::errors::MeshError;
use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

pub mod edge;
pub mod face;
pub mod vertex;

pub use edge::EdgeLoops;
pub use face::FaceLoops;
pub use vertex::VertexEdges;

element_handle!(
    /// A point of the mesh. Its position is the [`Vertex::POSITION`] column.
    Vertex
);

element_handle!(
    /// Connection between two distinct vertices.
    Edge
);

element_handle!(
    /// A polygon bounded by a cycle of at least 3 loops.
    Face
);

element_handle!(
    /// Directed corner of a face: one vertex, the edge to the next vertex, and
    /// the next loop around the same face.
    Loop
);

impl Vertex {
    pub const POSITION: &'static str = "Position";
    pub const EDGE: &'static str = "VertexEdge";
}

impl Edge {
    pub const VERTICES: &'static str = "EdgeVertices";
    pub const DISK: &'static str = "EdgeDiskNext";
    pub const LOOP: &'static str = "EdgeLoop";
}

impl Face {
    pub const LOOP: &'static str = "FaceLoop";
}

impl Loop {
    pub const FACE: &'static str = "LoopFace";
    pub const EDGE: &'static str = "LoopEdge";
    pub const VERTEX: &'static str = "LoopVertex";
    pub const NEXT: &'static str = "LoopNext";
    pub const RADIAL: &'static str = "LoopRadialNext";
}

/// Handles of the reserved topology columns.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Topology {
    pub(crate) position: PointAttribute<Vertex>,
    pub(crate) vertex_edge: ElementAttribute<Vertex, Edge>,
    pub(crate) edge_vertices: ElementTupleAttribute<Edge, Vertex, 2>,
    /// Next edge in the disk cycle of `vertex0` / `vertex1`.
    pub(crate) edge_disk: ElementTupleAttribute<Edge, Edge, 2>,
    pub(crate) edge_loop: ElementAttribute<Edge, Loop>,
    pub(crate) face_loop: ElementAttribute<Face, Loop>,
    pub(crate) loop_face: ElementAttribute<Loop, Face>,
    pub(crate) loop_edge: ElementAttribute<Loop, Edge>,
    pub(crate) loop_vertex: ElementAttribute<Loop, Vertex>,
    pub(crate) loop_next: ElementAttribute<Loop, Loop>,
    pub(crate) loop_radial: ElementAttribute<Loop, Loop>,
}

/// A polygon mesh with full vertex/edge/face/loop adjacency.
///
/// Single-writer: all operations take `&self` or `&mut self`, so the pools
/// cannot change while one of the iterators borrows the mesh.
#[derive(Debug)]
pub struct BMesh {
    vertex_data: ElementPool<Vertex>,
    edge_data: ElementPool<Edge>,
    face_data: ElementPool<Face>,
    loop_data: ElementPool<Loop>,
    topology: Topology,
}

impl Default for BMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl BMesh {
    pub fn new() -> Self {
        let mut vertex_data = ElementPool::new();
        let mut edge_data = ElementPool::new();
        let mut face_data = ElementPool::new();
        let mut loop_data = ElementPool::new();

        let topology = Topology {
            position: vertex_data.add_reserved_attribute(Vertex::POSITION),
            vertex_edge: vertex_data.add_reserved_attribute(Vertex::EDGE),
            edge_vertices: edge_data.add_reserved_attribute(Edge::VERTICES),
            edge_disk: edge_data.add_reserved_attribute(Edge::DISK),
            edge_loop: edge_data.add_reserved_attribute(Edge::LOOP),
            face_loop: face_data.add_reserved_attribute(Face::LOOP),
            loop_face: loop_data.add_reserved_attribute(Loop::FACE),
            loop_edge: loop_data.add_reserved_attribute(Loop::EDGE),
            loop_vertex: loop_data.add_reserved_attribute(Loop::VERTEX),
            loop_next: loop_data.add_reserved_attribute(Loop::NEXT),
            loop_radial: loop_data.add_reserved_attribute(Loop::RADIAL),
        };

        BMesh {
            vertex_data,
            edge_data,
            face_data,
            loop_data,
            topology,
        }
    }

    pub fn vertices(&self) -> impl ExactSizeIterator<Item = Vertex> + '_ {
        self.vertex_data.iter()
    }

    pub fn edges(&self) -> impl ExactSizeIterator<Item = Edge> + '_ {
        self.edge_data.iter()
    }

    pub fn faces(&self) -> impl ExactSizeIterator<Item = Face> + '_ {
        self.face_data.iter()
    }

    pub fn loops(&self) -> impl ExactSizeIterator<Item = Loop> + '_ {
        self.loop_data.iter()
    }

    pub const fn vertex_data(&self) -> &ElementPool<Vertex> {
        &self.vertex_data
    }

    pub const fn edge_data(&self) -> &ElementPool<Edge> {
        &self.edge_data
    }

    pub const fn face_data(&self) -> &ElementPool<Face> {
        &self.face_data
    }

    pub const fn loop_data(&self) -> &ElementPool<Loop> {
        &self.loop_data
    }

    /// Mutable vertex pool, for registering user attributes.
    ///
    /// Creating or removing elements through the pool bypasses the topology;
    /// keeping it consistent is then up to the caller.
    pub const fn vertex_data_mut(&mut self) -> &mut ElementPool<Vertex> {
        &mut self.vertex_data
    }

    pub const fn edge_data_mut(&mut self) -> &mut ElementPool<Edge> {
        &mut self.edge_data
    }

    pub const fn face_data_mut(&mut self) -> &mut ElementPool<Face> {
        &mut self.face_data
    }

    pub const fn loop_data_mut(&mut self) -> &mut ElementPool<Loop> {
        &mut self.loop_data
    }

    /// The vertex position column.
    pub const fn position_attribute(&self) -> PointAttribute<Vertex> {
        self.topology.position
    }

    /// The topological Loop -> Vertex column.
    pub const fn loop_vertex_attribute(&self) -> ElementAttribute<Loop, Vertex> {
        self.topology.loop_vertex
    }

    // TODO: Route creation through deduplication once vertex welding exists.
    pub fn create_vertex(&mut self) -> Vertex {
        self.vertex_data.create()
    }

    pub fn create_vertex_at(&mut self, position: Point3<Real>) -> Vertex {
        let vertex = self.vertex_data.create();
        if let Some(slot) = self.vertex_data.get_mut(self.topology.position, vertex) {
            *slot = position;
        }
        vertex
    }

    pub fn position(&self, vertex: Vertex) -> Option<Point3<Real>> {
        self.vertex_data.get(self.topology.position, vertex).copied()
    }

    pub fn set_position(&mut self, vertex: Vertex, position: Point3<Real>) -> Result<(), MeshError> {
        self.vertex_data.set(self.topology.position, vertex, position)
    }

    /// Translate one vertex.
    pub fn move_vertex(&mut self, vertex: Vertex, distance: Vector3<Real>) -> Result<(), MeshError> {
        let position = self
            .vertex_data
            .get_mut(self.topology.position, vertex)
            .ok_or(MeshError::StaleElement { kind: Vertex::KIND })?;
        *position += distance;
        Ok(())
    }

    /// Return the edge between `v0` and `v1`, creating it if it does not exist.
    ///
    /// The vertex order does not matter for finding an existing edge.
    pub fn get_or_create_edge(&mut self, v0: Vertex, v1: Vertex) -> Result<Edge, MeshError> {
        if v0 == v1 {
            return Err(MeshError::DegenerateEdge(v0));
        }
        self.ensure_vertex(v0)?;
        self.ensure_vertex(v1)?;

        if let Some(edge) = self.edge_between(v0, v1) {
            return Ok(edge);
        }

        let edge = self.edge_data.create();
        self.edge_data
            .set(self.topology.edge_vertices, edge, [Some(v0), Some(v1)])?;
        self.add_edge_to_disk(v0, edge)?;
        self.add_edge_to_disk(v1, edge)?;
        Ok(edge)
    }

    /// Create a face whose loop cycle visits `vertices` in the given order.
    ///
    /// Missing edges between consecutive vertices are created. The arguments
    /// are validated before anything is allocated, so a failed call leaves the
    /// mesh unchanged.
    pub fn create_face(&mut self, vertices: &[Vertex]) -> Result<Face, MeshError> {
        let n = vertices.len();
        if n < 3 {
            return Err(MeshError::TooFewVertices {
                required: 3,
                actual: n,
            });
        }
        for (i, &vertex) in vertices.iter().enumerate() {
            self.ensure_vertex(vertex)?;
            if vertex == vertices[(i + 1) % n] {
                return Err(MeshError::DegenerateEdge(vertex));
            }
        }

        let loops: Vec<Loop> = (0..n).map(|_| self.loop_data.create()).collect();
        let face = self.face_data.create();
        self.face_data.set(self.topology.face_loop, face, Some(loops[0]))?;

        for i in 0..n {
            let next = (i + 1) % n;
            let edge = self.get_or_create_edge(vertices[i], vertices[next])?;
            self.add_loop_to_edge(edge, loops[i])?;

            let l = loops[i];
            self.loop_data.set(self.topology.loop_face, l, Some(face))?;
            self.loop_data.set(self.topology.loop_edge, l, Some(edge))?;
            self.loop_data.set(self.topology.loop_vertex, l, Some(vertices[i]))?;
            self.loop_data.set(self.topology.loop_next, l, Some(loops[next]))?;
        }

        Ok(face)
    }

    /// Release spare storage of all four pools.
    pub fn compact_data(&mut self) {
        self.vertex_data.compact();
        self.edge_data.compact();
        self.face_data.compact();
        self.loop_data.compact();
    }

    pub fn loop_face(&self, l: Loop) -> Option<Face> {
        self.loop_data.get(self.topology.loop_face, l).copied().flatten()
    }

    pub fn loop_edge(&self, l: Loop) -> Option<Edge> {
        self.loop_data.get(self.topology.loop_edge, l).copied().flatten()
    }

    pub fn loop_vertex(&self, l: Loop) -> Option<Vertex> {
        self.loop_data.get(self.topology.loop_vertex, l).copied().flatten()
    }

    /// Next loop around the same face.
    pub fn loop_next(&self, l: Loop) -> Option<Loop> {
        self.loop_data.get(self.topology.loop_next, l).copied().flatten()
    }

    fn ensure_vertex(&self, vertex: Vertex) -> Result<(), MeshError> {
        if self.vertex_data.contains(vertex) {
            Ok(())
        } else {
            Err(MeshError::StaleElement { kind: Vertex::KIND })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_columns_are_reserved() {
        let mut mesh = BMesh::new();
        let position = mesh.position_attribute();
        let result = mesh.vertex_data_mut().remove_attribute(position);
        assert_eq!(
            result,
            Err(MeshError::ReservedAttribute {
                pool: "Vertex",
                name: Vertex::POSITION.to_string()
            })
        );
    }

    #[test]
    fn failed_face_leaves_mesh_untouched() {
        let mut mesh = BMesh::new();
        let a = mesh.create_vertex();
        let b = mesh.create_vertex();
        assert!(mesh.create_face(&[a, b, b]).is_err());
        assert_eq!(mesh.loops().len(), 0);
        assert_eq!(mesh.faces().len(), 0);
        assert_eq!(mesh.edges().len(), 0);
    }
}
