use crate::bmesh::Face;
use crate::errors::TriangulationError;
use crate::float_types::Real;
use crate::triangulate::IndexBuffer;
use nalgebra::Point3;

/// Splits one polygon into triangles.
///
/// `polygon` holds the face's vertex positions in loop order. Each produced
/// triangle is handed to `emit` as three indices into `polygon`. When an error
/// is returned, everything emitted during the call is discarded and the face
/// is skipped.
pub trait PolygonTriangulator {
    fn triangulate(
        &mut self,
        face: Face,
        polygon: &[Point3<Real>],
        emit: &mut dyn FnMut([usize; 3]),
    ) -> Result<(), TriangulationError>;
}

/// Receiver of finished index buffers, e.g. a GPU buffer object.
pub trait IndexBufferSink {
    fn setup_data(&mut self, buffer: IndexBuffer<'_>);
}

impl<T: PolygonTriangulator + ?Sized> PolygonTriangulator for Box<T> {
    fn triangulate(
        &mut self,
        face: Face,
        polygon: &[Point3<Real>],
        emit: &mut dyn FnMut([usize; 3]),
    ) -> Result<(), TriangulationError> {
        (**self).triangulate(face, polygon, emit)
    }
}

/// Keeps a copy of the last buffer it received.
impl IndexBufferSink for Vec<u32> {
    fn setup_data(&mut self, buffer: IndexBuffer<'_>) {
        self.clear();
        self.extend(buffer.iter());
    }
}
