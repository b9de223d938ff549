//! Edge queries and the radial cycle of loops sharing an edge

use crate::bmesh::{BMesh, Edge, Face, Loop, Vertex};
use crate::errors::MeshError;

/// Iterator over the loops incident to one edge (its radial cycle).
///
/// More than two loops means the edge is non-manifold.
#[derive(Debug, Clone)]
pub struct EdgeLoops<'a> {
    mesh: &'a BMesh,
    start: Option<Loop>,
    current: Option<Loop>,
    remaining: usize,
}

impl Iterator for EdgeLoops<'_> {
    type Item = Loop;

    fn next(&mut self) -> Option<Loop> {
        let current = self.current?;
        if self.remaining == 0 {
            self.current = None;
            return None;
        }
        self.remaining -= 1;

        self.current = self
            .mesh
            .loop_radial_next(current)
            .filter(|&next| Some(next) != self.start);
        Some(current)
    }
}

impl BMesh {
    /// Both vertices of `edge`, in creation order.
    pub fn edge_vertices(&self, edge: Edge) -> Option<(Vertex, Vertex)> {
        match self.edge_data.get(self.topology.edge_vertices, edge)? {
            [Some(v0), Some(v1)] => Some((*v0, *v1)),
            _ => None,
        }
    }

    /// The vertex of `edge` opposite to `vertex`.
    pub fn edge_other(&self, edge: Edge, vertex: Vertex) -> Option<Vertex> {
        let (v0, v1) = self.edge_vertices(edge)?;
        if v0 == vertex {
            Some(v1)
        } else if v1 == vertex {
            Some(v0)
        } else {
            None
        }
    }

    /// Whether `edge` connects `a` and `b`, in either direction.
    pub fn edge_connects(&self, edge: Edge, a: Vertex, b: Vertex) -> bool {
        match self.edge_vertices(edge) {
            Some((v0, v1)) => (v0 == a && v1 == b) || (v0 == b && v1 == a),
            None => false,
        }
    }

    /// All loops that use `edge`.
    pub fn edge_loops(&self, edge: Edge) -> EdgeLoops<'_> {
        let start = self
            .edge_data
            .get(self.topology.edge_loop, edge)
            .copied()
            .flatten();

        EdgeLoops {
            mesh: self,
            start,
            current: start,
            remaining: self.loop_data.len(),
        }
    }

    pub fn edge_loop_count(&self, edge: Edge) -> usize {
        self.edge_loops(edge).count()
    }

    /// Faces using `edge`, one entry per incident loop.
    pub fn edge_faces(&self, edge: Edge) -> impl Iterator<Item = Face> + '_ {
        self.edge_loops(edge).filter_map(|l| self.loop_face(l))
    }

    fn loop_radial_next(&self, l: Loop) -> Option<Loop> {
        self.loop_data.get(self.topology.loop_radial, l).copied().flatten()
    }

    /// Insert `l` into the radial cycle of `edge`.
    pub(crate) fn add_loop_to_edge(&mut self, edge: Edge, l: Loop) -> Result<(), MeshError> {
        let first = self
            .edge_data
            .get(self.topology.edge_loop, edge)
            .copied()
            .flatten();

        match first {
            None => {
                self.edge_data.set(self.topology.edge_loop, edge, Some(l))?;
                self.loop_data.set(self.topology.loop_radial, l, Some(l))
            },
            Some(first) => {
                let after = self.loop_radial_next(first).unwrap_or(first);
                self.loop_data.set(self.topology.loop_radial, l, Some(after))?;
                self.loop_data.set(self.topology.loop_radial, first, Some(l))
            },
        }
    }
}
