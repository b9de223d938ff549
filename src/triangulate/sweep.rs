//! Triangulators for polygons with more than four vertices
//!
//! Both flatten the polygon with a [`PlanarCoordinateSystem`] fitted to it and
//! hand the 2D outline to `geo`. Emitted triangles are oriented like the
//! polygon itself, so they face along its Newell normal.

use crate::bmesh::Face;
use crate::errors::TriangulationError;
use crate::float_types::Real;
use crate::planar::PlanarCoordinateSystem;
use crate::traits::PolygonTriangulator;
use geo::{Coord, LineString, Polygon as GeoPolygon};
use nalgebra::Point3;

/// Project `polygon` into its own plane, writing the 2D outline to `coords`.
fn project_polygon(
    polygon: &[Point3<Real>],
    coords: &mut Vec<Coord<Real>>,
) -> Result<(), TriangulationError> {
    if polygon.len() < 3 {
        return Err(TriangulationError::TooFewPoints(polygon.len()));
    }

    let pcs = PlanarCoordinateSystem::for_polygon(polygon.iter().copied())?;
    coords.clear();
    coords.reserve(polygon.len());
    for (index, point) in polygon.iter().enumerate() {
        let v = pcs.project(point);
        if !(v.x.is_finite() && v.y.is_finite()) {
            return Err(TriangulationError::InvalidCoordinate { index });
        }
        coords.push(Coord { x: v.x, y: v.y });
    }
    Ok(())
}

/// Emit `[a, b, c]` counter-clockwise in the projected plane.
fn emit_oriented(coords: &[Coord<Real>], [a, b, c]: [usize; 3], emit: &mut dyn FnMut([usize; 3])) {
    let (pa, pb, pc) = (coords[a], coords[b], coords[c]);
    let area2 = (pb.x - pa.x) * (pc.y - pa.y) - (pc.x - pa.x) * (pb.y - pa.y);
    if area2 < 0.0 {
        emit([a, c, b]);
    } else {
        emit([a, b, c]);
    }
}

/// Ear clipping through `geo`'s earcutr binding. The default triangulator.
#[derive(Debug, Clone, Default)]
pub struct EarcutTriangulator {
    coords: Vec<Coord<Real>>,
}

impl EarcutTriangulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolygonTriangulator for EarcutTriangulator {
    fn triangulate(
        &mut self,
        _face: Face,
        polygon: &[Point3<Real>],
        emit: &mut dyn FnMut([usize; 3]),
    ) -> Result<(), TriangulationError> {
        use geo::TriangulateEarcut;

        let mut coords = std::mem::take(&mut self.coords);
        project_polygon(polygon, &mut coords)?;
        let n = coords.len();

        let outline = GeoPolygon::new(LineString::new(coords), Vec::new());
        let triangulation = outline.earcut_triangles_raw();

        // geo closes the ring, which gives the first point a second index
        let (exterior, _) = outline.into_inner();
        self.coords = exterior.0;

        for tri in triangulation.triangle_indices.chunks_exact(3) {
            emit_oriented(&self.coords, [tri[0] % n, tri[1] % n, tri[2] % n], emit);
        }
        Ok(())
    }
}

/// Constrained Delaunay triangulation through `geo`'s spade binding.
///
/// Produces better shaped triangles than ear clipping for long, thin
/// polygons.
#[cfg(feature = "delaunay")]
#[derive(Debug, Clone, Default)]
pub struct SpadeTriangulator {
    coords: Vec<Coord<Real>>,
}

#[cfg(feature = "delaunay")]
impl SpadeTriangulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the outline point closest to `c`.
    fn index_of(&self, c: Coord<Real>) -> Result<usize, TriangulationError> {
        let distance_squared = |p: &Coord<Real>| (p.x - c.x).powi(2) + (p.y - c.y).powi(2);

        let (index, nearest) = self
            .coords
            .iter()
            .map(distance_squared)
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or(TriangulationError::TooFewPoints(0))?;

        if nearest > crate::float_types::min_vertex_distance_squared() {
            return Err(TriangulationError::Failed(format!(
                "triangulation introduced the new point ({}, {})",
                c.x, c.y
            )));
        }
        Ok(index)
    }
}

#[cfg(feature = "delaunay")]
impl PolygonTriangulator for SpadeTriangulator {
    fn triangulate(
        &mut self,
        _face: Face,
        polygon: &[Point3<Real>],
        emit: &mut dyn FnMut([usize; 3]),
    ) -> Result<(), TriangulationError> {
        use geo::TriangulateSpade;

        project_polygon(polygon, &mut self.coords)?;

        let outline = GeoPolygon::new(LineString::new(self.coords.clone()), Vec::new());
        let triangles = outline
            .constrained_triangulation(Default::default())
            .map_err(|e| TriangulationError::Failed(format!("{e:?}")))?;

        for triangle in triangles {
            let tri = [
                self.index_of(triangle.0)?,
                self.index_of(triangle.1)?,
                self.index_of(triangle.2)?,
            ];
            emit_oriented(&self.coords, tri, emit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Element, ElementKey};

    fn face() -> Face {
        Face::from_key(ElementKey {
            index: 0,
            generation: 0,
        })
    }

    #[test]
    fn earcut_pentagon_gives_three_triangles() {
        let pentagon = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.5, 1.5, 0.0),
            Point3::new(1.0, 2.5, 0.0),
            Point3::new(-0.5, 1.5, 0.0),
        ];

        let mut triangles = Vec::new();
        EarcutTriangulator::new()
            .triangulate(face(), &pentagon, &mut |t| triangles.push(t))
            .unwrap();

        assert_eq!(triangles.len(), 3);
        for t in &triangles {
            assert!(t.iter().all(|&i| i < pentagon.len()));
            // same winding as the counter-clockwise input
            let (a, b, c) = (pentagon[t[0]], pentagon[t[1]], pentagon[t[2]]);
            assert!((b - a).cross(&(c - a)).z > 0.0);
        }
    }

    #[test]
    fn collinear_polygon_is_rejected() {
        let line = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
        ];
        let result = EarcutTriangulator::new().triangulate(face(), &line, &mut |_| {});
        assert!(matches!(result, Err(TriangulationError::Projection(_))));
    }
}
