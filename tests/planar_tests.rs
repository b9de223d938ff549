mod support;

use approx::assert_relative_eq;
use loopmesh::{
    BMesh, MeshError, PlanarCoordinateSystem,
    float_types::Real,
    normal::newell_normal,
};
use nalgebra::{Point3, Vector2, Vector3};
use support::{approx_eq, make_face, regular_polygon, to_points, unit_square, zigzag_hexagon};

fn assert_orthonormal(pcs: &PlanarCoordinateSystem) {
    assert!(approx_eq(pcs.x_axis().norm(), 1.0, 1e-6));
    assert!(approx_eq(pcs.y_axis().norm(), 1.0, 1e-6));
    assert!(approx_eq(pcs.x_axis().dot(&pcs.y_axis()), 0.0, 1e-6));
}

#[test]
fn unit_square_lies_in_xy_plane() {
    let pcs = PlanarCoordinateSystem::for_polygon(to_points(&unit_square())).unwrap();
    assert_orthonormal(&pcs);
    assert_relative_eq!(pcs.normal(), Vector3::z(), epsilon = 1e-6);
    assert_eq!(pcs.origin(), Point3::origin());

    // y points along the direction sum (2, 2, 0)
    let half = (0.5 as Real).sqrt();
    assert_relative_eq!(pcs.y_axis(), Vector3::new(half, half, 0.0), epsilon = 1e-6);
    assert_relative_eq!(pcs.x_axis(), Vector3::new(half, -half, 0.0), epsilon = 1e-6);
}

#[test]
fn project_round_trip() {
    let pcs = PlanarCoordinateSystem::for_polygon(to_points(&[
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ]))
    .unwrap();
    assert_orthonormal(&pcs);

    // a point of the plane x + y + z = 1
    let p = Point3::new(0.2, 0.3, 0.5);
    let local = pcs.project(&p);
    assert_relative_eq!(pcs.unproject(&local), p, epsilon = 1e-6);

    assert_relative_eq!(pcs.project(&pcs.origin()), Vector2::zeros(), epsilon = 1e-9);
}

#[test]
fn polygon_normal_matches_newell() {
    let points = to_points(&[
        [0.0, 0.0, 0.0],
        [2.0, 0.0, 1.0],
        [2.0, 2.0, 1.0],
        [0.0, 2.0, 0.0],
    ]);
    let pcs = PlanarCoordinateSystem::for_polygon(points.iter().copied()).unwrap();
    let n = newell_normal(points.iter().copied()).normalize();
    assert_relative_eq!(pcs.normal(), n, epsilon = 1e-6);
}

#[test]
fn cancelled_direction_sum_uses_last_valid_offset() {
    // the first point sits in the middle, so the offsets cancel out
    let points = to_points(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, -1.0, 0.0],
    ]);
    let pcs = PlanarCoordinateSystem::for_polygon(points).unwrap();
    assert_relative_eq!(pcs.y_axis(), -Vector3::y(), epsilon = 1e-6);
    assert_relative_eq!(pcs.normal(), Vector3::z(), epsilon = 1e-6);
}

#[test]
fn too_few_distinct_points() {
    let p = [0.0, 0.0, 0.0];
    let result = PlanarCoordinateSystem::for_polygon(to_points(&[p, p, [1.0, 0.0, 0.0]]));
    assert_eq!(result, Err(MeshError::DegeneratePolygon { valid: 2 }));

    let result = PlanarCoordinateSystem::for_polygon(Vec::new());
    assert_eq!(result, Err(MeshError::DegeneratePolygon { valid: 0 }));
}

#[test]
fn collinear_points_have_no_normal() {
    let result = PlanarCoordinateSystem::for_polygon(to_points(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [2.0, 0.0, 0.0],
    ]));
    assert_eq!(result, Err(MeshError::DegeneratePolygon { valid: 3 }));
}

#[test]
fn small_polygons_have_a_frame() {
    // Newell normals this short are still valid directions
    let square: Vec<[Real; 3]> = unit_square()
        .iter()
        .map(|&[x, y, z]| [x * 0.01, y * 0.01, z])
        .collect();
    let pcs = PlanarCoordinateSystem::for_polygon(to_points(&square)).unwrap();
    assert_orthonormal(&pcs);
    assert_relative_eq!(pcs.normal(), Vector3::z(), epsilon = 1e-6);

    let pcs = PlanarCoordinateSystem::for_polygon(to_points(&regular_polygon(5, 0.01))).unwrap();
    assert_orthonormal(&pcs);
    assert_relative_eq!(pcs.normal(), Vector3::z(), epsilon = 1e-6);
}

#[test]
fn short_normal_is_accepted() {
    let pcs = PlanarCoordinateSystem::with_x(Vector3::x(), Vector3::new(0.0, 0.0, 1e-4)).unwrap();
    assert_relative_eq!(pcs.normal(), Vector3::z(), epsilon = 1e-6);

    let result = PlanarCoordinateSystem::with_y(Vector3::y(), Vector3::zeros());
    assert!(matches!(result, Err(MeshError::InvalidAxis { axis: 'n', .. })));
}

#[test]
fn non_planar_polygon_gets_average_plane() {
    let pcs = PlanarCoordinateSystem::for_polygon(to_points(&zigzag_hexagon())).unwrap();
    assert_orthonormal(&pcs);
    assert_relative_eq!(pcs.normal(), Vector3::z(), epsilon = 1e-3);
}

#[test]
fn axis_must_be_unit_length() {
    let result = PlanarCoordinateSystem::with_x(Vector3::new(2.0, 0.0, 0.0), Vector3::z());
    assert!(matches!(result, Err(MeshError::InvalidAxis { axis: 'x', .. })));

    let result = PlanarCoordinateSystem::with_y(Vector3::new(0.0, 0.5, 0.0), Vector3::z());
    assert!(matches!(result, Err(MeshError::InvalidAxis { axis: 'y', .. })));
}

#[test]
fn axis_parallel_to_normal() {
    let result = PlanarCoordinateSystem::with_x(Vector3::z(), Vector3::z());
    assert!(matches!(result, Err(MeshError::InvalidAxis { axis: 'y', .. })));
}

#[test]
fn axis_is_projected_into_plane() {
    // slightly tilted x axis, within the unit length tolerance
    let x = Vector3::new(1.0, 0.0, 0.0004);
    let pcs = PlanarCoordinateSystem::with_x(x, Vector3::z()).unwrap();
    assert_orthonormal(&pcs);
    assert_relative_eq!(pcs.x_axis().dot(&Vector3::z()), 0.0, epsilon = 1e-9);
    assert_relative_eq!(pcs.normal(), Vector3::z(), epsilon = 1e-6);
}

#[test]
fn difference_constructors() {
    let start = Point3::new(1.0, 1.0, 0.0);
    let pcs =
        PlanarCoordinateSystem::with_x_difference(start, Point3::new(4.0, 1.0, 0.0), Vector3::z())
            .unwrap();
    assert_eq!(pcs.origin(), start);
    assert_relative_eq!(pcs.x_axis(), Vector3::x(), epsilon = 1e-6);
    assert_relative_eq!(pcs.y_axis(), Vector3::y(), epsilon = 1e-6);

    let pcs =
        PlanarCoordinateSystem::with_y_difference(start, Point3::new(1.0, 5.0, 0.0), Vector3::z())
            .unwrap();
    assert_relative_eq!(pcs.x_axis(), Vector3::x(), epsilon = 1e-6);
    assert_relative_eq!(pcs.y_axis(), Vector3::y(), epsilon = 1e-6);
}

#[test]
fn coincident_points_are_rejected() {
    let p = Point3::new(1.0, 1.0, 1.0);
    let result = PlanarCoordinateSystem::with_x_difference(p, p, Vector3::z());
    assert!(matches!(result, Err(MeshError::PointsTooClose { .. })));
}

#[test]
fn face_frame_matches_polygon_frame() {
    let mut mesh = BMesh::new();
    let (face, _) = make_face(&mut mesh, &unit_square());
    let from_face = PlanarCoordinateSystem::for_face(&mesh, face).unwrap();
    let from_points = PlanarCoordinateSystem::for_polygon(to_points(&unit_square())).unwrap();
    assert_eq!(from_face, from_points);
}

#[test]
fn rotated_frame_stays_in_plane() {
    let mut pcs = PlanarCoordinateSystem::for_polygon(to_points(&[
        [0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 1.0],
        [0.0, 0.0, 1.0],
    ]))
    .unwrap();
    let normal = pcs.normal();
    pcs.rotate(1.0);
    assert_orthonormal(&pcs);
    assert_relative_eq!(pcs.normal(), normal, epsilon = 1e-6);
}
