//! Test support library
//! Provides various helper functions & utilities for tests.

use loopmesh::{BMesh, Face, Vertex, float_types::Real};
use nalgebra::Point3;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Create one vertex per point.
pub fn add_vertices(mesh: &mut BMesh, points: &[[Real; 3]]) -> Vec<Vertex> {
    points
        .iter()
        .map(|p| mesh.create_vertex_at(Point3::new(p[0], p[1], p[2])))
        .collect()
}

/// Create fresh vertices at `points` and a face through them.
pub fn make_face(mesh: &mut BMesh, points: &[[Real; 3]]) -> (Face, Vec<Vertex>) {
    let vertices = add_vertices(mesh, points);
    let face = mesh.create_face(&vertices).unwrap();
    (face, vertices)
}

/// Counter-clockwise unit square in the XY plane.
pub fn unit_square() -> [[Real; 3]; 4] {
    [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ]
}

/// Counter-clockwise regular polygon with `n` corners around the origin.
pub fn regular_polygon(n: usize, radius: Real) -> Vec<[Real; 3]> {
    (0..n)
        .map(|i| {
            let angle = 2.0 * loopmesh::float_types::PI * i as Real / n as Real;
            [radius * angle.cos(), radius * angle.sin(), 0.0]
        })
        .collect()
}

/// Regular hexagon of radius 1 whose corners alternate between `z = ±0.1`.
pub fn zigzag_hexagon() -> Vec<[Real; 3]> {
    regular_polygon(6, 1.0)
        .into_iter()
        .enumerate()
        .map(|(i, [x, y, _])| [x, y, if i % 2 == 0 { 0.1 } else { -0.1 }])
        .collect()
}

pub fn to_points(points: &[[Real; 3]]) -> Vec<Point3<Real>> {
    points.iter().map(|p| Point3::new(p[0], p[1], p[2])).collect()
}
