//! Face loop traversal and face queries

use crate::bmesh::{BMesh, Edge, Face, Loop, Vertex};

/// Forward traversal of a face's loop cycle.
///
/// Starts at the face's stored starting loop and ends right before reaching
/// it again. A live face always yields at least one loop. The traversal is
/// bounded by the size of the loop pool, so a corrupted cycle still ends.
#[derive(Debug, Clone)]
pub struct FaceLoops<'a> {
    mesh: &'a BMesh,
    start: Option<Loop>,
    current: Option<Loop>,
    remaining: usize,
}

impl Iterator for FaceLoops<'_> {
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
            .loop_next(current)
            .filter(|&next| Some(next) != self.start);
        Some(current)
    }
}

impl BMesh {
    /// The starting loop of `face`.
    pub fn face_loop(&self, face: Face) -> Option<Loop> {
        self.face_data.get(self.topology.face_loop, face).copied().flatten()
    }

    /// Loops of `face` in cycle order, beginning with the starting loop.
    pub fn face_loops(&self, face: Face) -> FaceLoops<'_> {
        let start = self.face_loop(face);
        FaceLoops {
            mesh: self,
            start,
            current: start,
            remaining: self.loop_data.len(),
        }
    }

    /// Vertices of `face` in cycle order.
    pub fn face_vertices(&self, face: Face) -> impl Iterator<Item = Vertex> + '_ {
        self.face_loops(face).filter_map(|l| self.loop_vertex(l))
    }

    /// Edges of `face` in cycle order. Edge `i` leads from vertex `i` to `i + 1`.
    pub fn face_edges(&self, face: Face) -> impl Iterator<Item = Edge> + '_ {
        self.face_loops(face).filter_map(|l| self.loop_edge(l))
    }

    pub fn face_vertex_count(&self, face: Face) -> usize {
        self.face_loops(face).count()
    }

    /// Append the loops of `face` to `out`.
    pub fn collect_face_loops(&self, face: Face, out: &mut Vec<Loop>) {
        out.extend(self.face_loops(face));
    }

    /// Any edge that both faces use.
    pub fn any_common_edge(&self, face: Face, other: Face) -> Option<Edge> {
        self.face_edges(face)
            .find(|&edge| self.face_edges(other).any(|e| e == edge))
    }

    /// All edges used by both faces, each listed once, in the loop order of `face`.
    pub fn common_edges(&self, face: Face, other: Face) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(4);
        for edge in self.face_edges(face) {
            if !edges.contains(&edge) && self.face_edges(other).any(|e| e == edge) {
                edges.push(edge);
            }
        }
        edges
    }
}
