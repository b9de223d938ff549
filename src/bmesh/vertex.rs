//! Vertex adjacency: the disk cycle of edges around a vertex

use crate::bmesh::{BMesh, Edge, Vertex};
use crate::data::Element;
use crate::errors::MeshError;

/// Iterator over the edges incident to one vertex.
///
/// Edges around a vertex have no geometric order; in non-manifold meshes
/// no such order exists in general.
#[derive(Debug, Clone)]
pub struct VertexEdges<'a> {
    mesh: &'a BMesh,
    vertex: Vertex,
    start: Option<Edge>,
    current: Option<Edge>,
    remaining: usize,
}

impl Iterator for VertexEdges<'_> {
    type Item = Edge;

    fn next(&mut self) -> Option<Edge> {
        let current = self.current?;
        if self.remaining == 0 {
            self.current = None;
            return None;
        }
        self.remaining -= 1;

        self.current = self
            .mesh
            .disk_next(current, self.vertex)
            .filter(|&next| Some(next) != self.start);
        Some(current)
    }
}

impl BMesh {
    /// All edges incident to `vertex`.
    pub fn vertex_edges(&self, vertex: Vertex) -> VertexEdges<'_> {
        let start = self
            .vertex_data
            .get(self.topology.vertex_edge, vertex)
            .copied()
            .flatten();

        VertexEdges {
            mesh: self,
            vertex,
            start,
            current: start,
            remaining: self.edge_data.len(),
        }
    }

    /// The existing edge connecting `v0` and `v1`, in either direction.
    pub fn edge_between(&self, v0: Vertex, v1: Vertex) -> Option<Edge> {
        self.vertex_edges(v0).find(|&edge| self.edge_connects(edge, v0, v1))
    }

    /// Which end of `edge` is `vertex`: 0 for `vertex0`, 1 for `vertex1`.
    fn disk_side(&self, edge: Edge, vertex: Vertex) -> Option<usize> {
        let (v0, v1) = self.edge_vertices(edge)?;
        if v0 == vertex {
            Some(0)
        } else if v1 == vertex {
            Some(1)
        } else {
            None
        }
    }

    /// Next edge after `edge` in the disk cycle of `vertex`.
    pub(crate) fn disk_next(&self, edge: Edge, vertex: Vertex) -> Option<Edge> {
        let side = self.disk_side(edge, vertex)?;
        self.edge_data.get(self.topology.edge_disk, edge)?[side]
    }

    fn set_disk_next(&mut self, edge: Edge, vertex: Vertex, next: Edge) -> Result<(), MeshError> {
        let side = self
            .disk_side(edge, vertex)
            .ok_or(MeshError::StaleElement { kind: Edge::KIND })?;
        let links = self
            .edge_data
            .get_mut(self.topology.edge_disk, edge)
            .ok_or(MeshError::StaleElement { kind: Edge::KIND })?;
        links[side] = Some(next);
        Ok(())
    }

    /// Insert `edge` into the disk cycle of `vertex`, right after the
    /// vertex's current edge.
    pub(crate) fn add_edge_to_disk(&mut self, vertex: Vertex, edge: Edge) -> Result<(), MeshError> {
        let first = self
            .vertex_data
            .get(self.topology.vertex_edge, vertex)
            .copied()
            .flatten();

        match first {
            None => {
                self.vertex_data
                    .set(self.topology.vertex_edge, vertex, Some(edge))?;
                self.set_disk_next(edge, vertex, edge)
            },
            Some(first) => {
                let after = self.disk_next(first, vertex).unwrap_or(first);
                self.set_disk_next(edge, vertex, after)?;
                self.set_disk_next(first, vertex, edge)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::Real;
    use nalgebra::Point3;

    #[test]
    fn disk_cycle_contains_all_edges() {
        let mut mesh = BMesh::new();
        let center = mesh.create_vertex_at(Point3::origin());
        let spokes: Vec<Vertex> = (0..4)
            .map(|i| mesh.create_vertex_at(Point3::new(i as Real, 1.0, 0.0)))
            .collect();

        let edges: Vec<Edge> = spokes
            .iter()
            .map(|&s| mesh.get_or_create_edge(center, s).unwrap())
            .collect();

        let mut around: Vec<Edge> = mesh.vertex_edges(center).collect();
        around.sort();
        let mut expected = edges.clone();
        expected.sort();
        assert_eq!(around, expected);

        for (&spoke, &edge) in spokes.iter().zip(&edges) {
            assert_eq!(mesh.vertex_edges(spoke).collect::<Vec<_>>(), vec![edge]);
        }
    }

    #[test]
    fn disk_link_needs_edge_end() {
        let mut mesh = BMesh::new();
        let a = mesh.create_vertex();
        let b = mesh.create_vertex();
        let other = mesh.create_vertex();
        let edge = mesh.get_or_create_edge(a, b).unwrap();

        assert_eq!(
            mesh.set_disk_next(edge, other, edge),
            Err(MeshError::StaleElement { kind: "Edge" })
        );
    }
}
