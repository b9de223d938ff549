//! Face triangulation and render index generation
//!
//! [`TriangleIndices`] splits every face of a [`BMesh`] into triangles and
//! keeps them in its own pool of ephemeral [`Triangle`] elements, one column
//! holding the three loops of each triangle. From those it emits a flat render
//! index buffer whose index width follows the size of the vertex pool.
//!
//! Triangles, quads and larger polygons take different paths: triangles are
//! copied, quads are split along their shorter valid diagonal, and everything
//! larger goes through a [`PolygonTriangulator`]. Faces that cannot be
//! triangulated are skipped and reported through
//! [`TriangleIndices::diagnostics`].

use crate::bmesh::{BMesh, Face, Loop, Vertex};
use crate::data::{
    Element, ElementAttribute, ElementPool, ElementTupleAttribute, IntTupleAttribute,
    ShortTupleAttribute, element_handle,
};
use crate::errors::{MeshError, TriangulationError};
use crate::float_types::Real;
use crate::traits::{IndexBufferSink, PolygonTriangulator};
use nalgebra::Point3;
use std::fmt;
use tracing::{debug, warn};

pub mod index_buffer;
pub mod sweep;

pub use index_buffer::{
    BufferUsage, IndexBuffer, IndexData, IndexFormat, IndexState, IndexTransition, IndexWidth,
    MAX_SHORT_INDEX, PrimitiveMode,
};
#[cfg(feature = "delaunay")]
pub use sweep::SpadeTriangulator;
pub use sweep::EarcutTriangulator;

element_handle!(
    /// One triangle of a triangulation pass. Only valid until the next pass.
    Triangle
);

impl Triangle {
    pub const LOOPS: &'static str = "TriangleLoops";
    pub const INDICES: &'static str = "TriangleIndices";
}

/// Diagonal chosen to split a quad `p0 p1 p2 p3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadDiagonal {
    /// Triangles `(0, 1, 2)` and `(0, 2, 3)`.
    Diagonal02,
    /// Triangles `(0, 1, 3)` and `(1, 2, 3)`.
    Diagonal13,
}

impl QuadDiagonal {
    pub const fn triangles(self) -> [[usize; 3]; 2] {
        match self {
            QuadDiagonal::Diagonal02 => [[0, 1, 2], [0, 2, 3]],
            QuadDiagonal::Diagonal13 => [[0, 1, 3], [1, 2, 3]],
        }
    }
}

/// Pick the diagonal of a quad to split along.
///
/// A diagonal is valid when the two remaining corners lie on opposite sides of
/// it, which rules out the diagonal running outside of a concave (arrowhead)
/// quad. Of the valid diagonals the shorter one wins; ties and the case of no
/// valid diagonal at all go to `(0, 2)`.
pub fn choose_quad_diagonal(
    p0: &Point3<Real>,
    p1: &Point3<Real>,
    p2: &Point3<Real>,
    p3: &Point3<Real>,
) -> QuadDiagonal {
    // test 1 and 3 against diagonal 0 -> 2
    let diagonal = p2 - p0;
    let cross = diagonal.cross(&(p1 - p0));
    let v = (p3 - p0).cross(&diagonal);
    let length_0_2 = if cross.dot(&v) > 0.0 {
        diagonal.norm_squared()
    } else {
        Real::INFINITY
    };

    // test 0 and 2 against diagonal 1 -> 3
    let diagonal = p3 - p1;
    let cross = diagonal.cross(&(p0 - p1));
    let v = (p2 - p1).cross(&diagonal);
    let length_1_3 = if cross.dot(&v) > 0.0 {
        diagonal.norm_squared()
    } else {
        Real::INFINITY
    };

    if length_0_2 <= length_1_3 {
        QuadDiagonal::Diagonal02
    } else {
        QuadDiagonal::Diagonal13
    }
}

/// Verify that `triples` triangulate an `n`-gon without new points: exactly
/// `n - 2` triangles, every index in range and every corner used.
fn check_triples(
    triples: &[[usize; 3]],
    n: usize,
    used: &mut Vec<bool>,
) -> Result<(), TriangulationError> {
    if let Some(&index) = triples.iter().flatten().find(|&&i| i >= n) {
        return Err(TriangulationError::IndexOutOfRange { index, len: n });
    }

    let expected = n.saturating_sub(2);
    if triples.len() != expected {
        return Err(TriangulationError::Incomplete {
            triangles: triples.len(),
            expected,
        });
    }

    used.clear();
    used.resize(n, false);
    for &i in triples.iter().flatten() {
        used[i] = true;
    }
    match used.iter().position(|&u| !u) {
        Some(index) => Err(TriangulationError::UnusedPoint { index }),
        None => Ok(()),
    }
}

/// Why a face produced no triangles.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The face has fewer than 3 loops.
    TooFewVertices,
    /// A loop of the face has no vertex or its vertex has no position.
    MissingPosition,
    Triangulator(TriangulationError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooFewVertices => write!(f, "too few vertices"),
            SkipReason::MissingPosition => write!(f, "missing vertex position"),
            SkipReason::Triangulator(e) => write!(f, "triangulator failed: {e}"),
        }
    }
}

/// A face that was skipped by the last [`TriangleIndices::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct TriangulationDiagnostic {
    pub face: Face,
    pub vertex_count: usize,
    pub reason: SkipReason,
}

/// Triangulation of a [`BMesh`] plus the render indices derived from it.
///
/// Call [`apply`](Self::apply) after the topology changed and
/// [`update`](Self::update) whenever the render indices are needed. Render
/// indices are the storage slots of vertices in the mesh's vertex pool, so
/// `update` must run again after vertices were removed.
pub struct TriangleIndices<T: PolygonTriangulator = EarcutTriangulator> {
    triangle_data: ElementPool<Triangle>,
    attr_triangle_loops: ElementTupleAttribute<Triangle, Loop, 3>,
    attr_loop_vertex: ElementAttribute<Loop, Vertex>,
    triangulator: T,

    state: IndexState,
    attr_indices_short: Option<ShortTupleAttribute<Triangle, 3>>,
    attr_indices_int: Option<IntTupleAttribute<Triangle, 3>>,
    short_buffer: Vec<u16>,
    int_buffer: Vec<u32>,

    // scratch, reused across faces and passes
    loops: Vec<Loop>,
    positions: Vec<Point3<Real>>,
    triples: Vec<[usize; 3]>,
    used: Vec<bool>,
    diagnostics: Vec<TriangulationDiagnostic>,
}

impl<T: PolygonTriangulator> fmt::Debug for TriangleIndices<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriangleIndices")
            .field("triangles", &self.triangle_data.len())
            .field("state", &self.state)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl TriangleIndices<EarcutTriangulator> {
    /// Triangulation that resolves loops to vertices through `loop_vertex`.
    pub fn new(loop_vertex: ElementAttribute<Loop, Vertex>) -> Self {
        Self::with_triangulator(loop_vertex, EarcutTriangulator::new())
    }

    /// Triangulation that follows the mesh's own Loop -> Vertex topology.
    pub fn for_mesh(mesh: &BMesh) -> Self {
        Self::new(mesh.loop_vertex_attribute())
    }
}

impl<T: PolygonTriangulator> TriangleIndices<T> {
    /// `loop_vertex` picks the vertex whose slot becomes the render index of a
    /// loop. It does not have to be the topological mapping, e.g. to share
    /// render vertices between several mesh vertices.
    pub fn with_triangulator(loop_vertex: ElementAttribute<Loop, Vertex>, triangulator: T) -> Self {
        let mut triangle_data = ElementPool::new();
        let attr_triangle_loops = triangle_data.add_reserved_attribute(Triangle::LOOPS);

        TriangleIndices {
            triangle_data,
            attr_triangle_loops,
            attr_loop_vertex: loop_vertex,
            triangulator,
            state: IndexState::Empty,
            attr_indices_short: None,
            attr_indices_int: None,
            short_buffer: Vec::new(),
            int_buffer: Vec::new(),
            loops: Vec::new(),
            positions: Vec::new(),
            triples: Vec::new(),
            used: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub const fn triangulator(&self) -> &T {
        &self.triangulator
    }

    pub const fn triangulator_mut(&mut self) -> &mut T {
        &mut self.triangulator
    }

    /// The triangles of the last pass.
    pub const fn triangles(&self) -> &ElementPool<Triangle> {
        &self.triangle_data
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_data.len()
    }

    /// The three loops of `triangle`, in winding order.
    pub fn triangle_loops(&self, triangle: Triangle) -> Option<[Loop; 3]> {
        match self.triangle_data.get(self.attr_triangle_loops, triangle)? {
            [Some(a), Some(b), Some(c)] => Some([*a, *b, *c]),
            _ => None,
        }
    }

    /// Faces skipped by the last pass.
    pub fn diagnostics(&self) -> &[TriangulationDiagnostic] {
        &self.diagnostics
    }

    pub const fn index_state(&self) -> IndexState {
        self.state
    }

    /// Rebuild all triangles from the faces of `mesh`.
    pub fn apply(&mut self, mesh: &BMesh) {
        self.triangle_data.clear();
        self.triangle_data.ensure_capacity(mesh.face_data().len());
        self.diagnostics.clear();

        let mut loops = std::mem::take(&mut self.loops);
        for face in mesh.faces() {
            loops.clear();
            mesh.collect_face_loops(face, &mut loops);

            match loops.len() {
                3 => self.add_triangle(&loops, [0, 1, 2]),
                4 => self.triangulate_quad(mesh, face, &loops),
                n if n > 4 => self.triangulate_polygon(mesh, face, &loops),
                n => self.skip(face, n, SkipReason::TooFewVertices),
            }
        }
        self.loops = loops;
    }

    fn add_triangle(&mut self, loops: &[Loop], [i0, i1, i2]: [usize; 3]) {
        let triangle = self.triangle_data.create();
        if let Some(value) = self.triangle_data.get_mut(self.attr_triangle_loops, triangle) {
            *value = [Some(loops[i0]), Some(loops[i1]), Some(loops[i2])];
        }
    }

    fn skip(&mut self, face: Face, vertex_count: usize, reason: SkipReason) {
        warn!(?face, vertex_count, %reason, "couldn't triangulate face");
        self.diagnostics.push(TriangulationDiagnostic {
            face,
            vertex_count,
            reason,
        });
    }

    /// Fill `self.positions` with the positions of `loops`.
    fn collect_positions(&mut self, mesh: &BMesh, loops: &[Loop]) -> bool {
        self.positions.clear();
        for &l in loops {
            match mesh.loop_vertex(l).and_then(|vertex| mesh.position(vertex)) {
                Some(position) => self.positions.push(position),
                None => return false,
            }
        }
        true
    }

    fn triangulate_quad(&mut self, mesh: &BMesh, face: Face, loops: &[Loop]) {
        if !self.collect_positions(mesh, loops) {
            self.skip(face, loops.len(), SkipReason::MissingPosition);
            return;
        }

        let p = &self.positions;
        let diagonal = choose_quad_diagonal(&p[0], &p[1], &p[2], &p[3]);
        for triangle in diagonal.triangles() {
            self.add_triangle(loops, triangle);
        }
    }

    fn triangulate_polygon(&mut self, mesh: &BMesh, face: Face, loops: &[Loop]) {
        let n = loops.len();
        if !self.collect_positions(mesh, loops) {
            self.skip(face, n, SkipReason::MissingPosition);
            return;
        }

        // buffer the output so a failing triangulator leaves nothing behind
        self.triples.clear();
        let triples = &mut self.triples;
        let mut emit = |triangle| triples.push(triangle);
        let mut result = self
            .triangulator
            .triangulate(face, &self.positions, &mut emit);

        if result.is_ok() {
            result = check_triples(&self.triples, n, &mut self.used);
        }

        match result {
            Ok(()) => {
                let triples = std::mem::take(&mut self.triples);
                for &triangle in &triples {
                    self.add_triangle(loops, triangle);
                }
                self.triples = triples;
            },
            Err(e) => self.skip(face, n, SkipReason::Triangulator(e)),
        }
    }

    /// Recompute the render indices of all triangles.
    ///
    /// Uses 16 bit indices while the vertex pool's high-water size allows it
    /// and 32 bit indices otherwise.
    pub fn update(&mut self, mesh: &BMesh) -> Result<IndexBuffer<'_>, MeshError> {
        if !mesh.loop_data().has_attribute(self.attr_loop_vertex) {
            return Err(MeshError::StaleAttribute { pool: Loop::KIND });
        }

        let max_index = mesh.vertex_data().total_size().saturating_sub(1);
        let required = IndexWidth::for_max_index(max_index);
        self.switch_width(required)?;

        match required {
            IndexWidth::U16 => self.update_short(mesh)?,
            IndexWidth::U32 => self.update_int(mesh)?,
        }

        self.index_buffer()
            .ok_or(MeshError::StaleAttribute { pool: Triangle::KIND })
    }

    /// [`update`](Self::update), then hand the buffer to `sink`.
    pub fn update_into(
        &mut self,
        mesh: &BMesh,
        sink: &mut dyn IndexBufferSink,
    ) -> Result<(), MeshError> {
        let buffer = self.update(mesh)?;
        sink.setup_data(buffer);
        Ok(())
    }

    /// The buffer produced by the last [`update`](Self::update).
    pub fn index_buffer(&self) -> Option<IndexBuffer<'_>> {
        match self.state {
            IndexState::Empty => None,
            IndexState::U16 => Some(IndexBuffer::triangles(IndexData::U16(&self.short_buffer))),
            IndexState::U32 => Some(IndexBuffer::triangles(IndexData::U32(&self.int_buffer))),
        }
    }

    fn switch_width(&mut self, required: IndexWidth) -> Result<(), MeshError> {
        let (next, transition) = self.state.transition(required);

        // both columns share one name, so detach before attaching
        match transition.detach {
            Some(IndexWidth::U16) => {
                if let Some(attribute) = self.attr_indices_short.take() {
                    self.triangle_data.remove_attribute(attribute)?;
                }
            },
            Some(IndexWidth::U32) => {
                if let Some(attribute) = self.attr_indices_int.take() {
                    self.triangle_data.remove_attribute(attribute)?;
                }
            },
            None => {},
        }

        match transition.attach {
            Some(IndexWidth::U16) => {
                self.attr_indices_short = Some(self.triangle_data.add_attribute(Triangle::INDICES)?);
            },
            Some(IndexWidth::U32) => {
                self.attr_indices_int = Some(self.triangle_data.add_attribute(Triangle::INDICES)?);
            },
            None => {},
        }

        if next != self.state {
            debug!(from = ?self.state, to = ?next, "switched render index width");
        }
        self.state = next;
        Ok(())
    }

    /// Vertex slots of the three loops of `triangle`.
    fn render_indices(&self, mesh: &BMesh, triangle: Triangle) -> Result<[usize; 3], MeshError> {
        let loops = *self
            .triangle_data
            .get(self.attr_triangle_loops, triangle)
            .ok_or(MeshError::StaleElement { kind: Triangle::KIND })?;

        let mut indices = [0; 3];
        for (index, l) in indices.iter_mut().zip(loops) {
            let l = l.ok_or(MeshError::StaleElement { kind: Loop::KIND })?;
            let vertex = mesh
                .loop_data()
                .get(self.attr_loop_vertex, l)
                .copied()
                .flatten()
                .ok_or(MeshError::StaleElement { kind: Loop::KIND })?;
            *index = mesh
                .vertex_data()
                .slot_of(vertex)
                .ok_or(MeshError::StaleElement { kind: Vertex::KIND })?;
        }
        Ok(indices)
    }

    fn update_short(&mut self, mesh: &BMesh) -> Result<(), MeshError> {
        let attribute = self
            .attr_indices_short
            .ok_or(MeshError::StaleAttribute { pool: Triangle::KIND })?;

        for slot in 0..self.triangle_data.len() {
            let Some(triangle) = self.triangle_data.element_at(slot) else {
                break;
            };
            let [a, b, c] = self.render_indices(mesh, triangle)?;
            let short = |index: usize| {
                u16::try_from(index).map_err(|_| MeshError::IndexOverflow { index })
            };
            self.triangle_data
                .set(attribute, triangle, [short(a)?, short(b)?, short(c)?])?;
        }

        let capacity = self.short_buffer.capacity();
        self.triangle_data
            .compact_data_into(attribute, &mut self.short_buffer)?;
        if self.short_buffer.capacity() != capacity {
            debug!(capacity = self.short_buffer.capacity(), "made new short index buffer");
        }
        Ok(())
    }

    fn update_int(&mut self, mesh: &BMesh) -> Result<(), MeshError> {
        let attribute = self
            .attr_indices_int
            .ok_or(MeshError::StaleAttribute { pool: Triangle::KIND })?;

        for slot in 0..self.triangle_data.len() {
            let Some(triangle) = self.triangle_data.element_at(slot) else {
                break;
            };
            let [a, b, c] = self.render_indices(mesh, triangle)?;
            let int = |index: usize| {
                u32::try_from(index).map_err(|_| MeshError::IndexOverflow { index })
            };
            self.triangle_data
                .set(attribute, triangle, [int(a)?, int(b)?, int(c)?])?;
        }

        let capacity = self.int_buffer.capacity();
        self.triangle_data
            .compact_data_into(attribute, &mut self.int_buffer)?;
        if self.int_buffer.capacity() != capacity {
            debug!(capacity = self.int_buffer.capacity(), "made new int index buffer");
        }
        Ok(())
    }
}
