//! Local 2D coordinate frames embedded in 3D space
//!
//! A [`PlanarCoordinateSystem`] flattens a (roughly planar) polygon so that
//! 2D algorithms like ear clipping can work on it.

use crate::bmesh::{BMesh, Face};
use crate::errors::MeshError;
use crate::float_types::{AXIS_LENGTH_EPSILON_SQUARED, Real, min_vertex_distance_squared};
use crate::normal::add_to_normal;
use nalgebra::{Point3, Unit, UnitQuaternion, Vector2, Vector3};
use std::fmt;

/// Orthonormal frame with origin `p` and axes `x`, `y`.
///
/// Every constructor takes (or derives) a plane normal `n` and returns a
/// right-handed frame with `x × y = n̂`, both axes orthogonal to `n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarCoordinateSystem {
    p: Point3<Real>,
    x: Vector3<Real>,
    y: Vector3<Real>,
}

impl Default for PlanarCoordinateSystem {
    /// The world XY plane.
    fn default() -> Self {
        PlanarCoordinateSystem {
            p: Point3::origin(),
            x: Vector3::x(),
            y: Vector3::y(),
        }
    }
}

/// Fails unless `v` has (nearly) unit length.
fn check_unit(axis: char, v: &Vector3<Real>) -> Result<(), MeshError> {
    let length_squared = v.norm_squared();
    if (1.0 - length_squared).abs() <= AXIS_LENGTH_EPSILON_SQUARED {
        Ok(())
    } else {
        Err(MeshError::InvalidAxis {
            axis,
            length_squared,
        })
    }
}

/// Normalize `v`, failing if it is too short to carry a direction.
fn normalized(axis: char, v: Vector3<Real>) -> Result<Vector3<Real>, MeshError> {
    let length_squared = v.norm_squared();
    // also rejects NaN
    if !(length_squared > AXIS_LENGTH_EPSILON_SQUARED) {
        return Err(MeshError::InvalidAxis {
            axis,
            length_squared,
        });
    }
    Ok(v / length_squared.sqrt())
}

/// Normalize a plane normal. Its length only has to be nonzero, so the
/// normals of small polygons pass.
fn unit_normal(n: Vector3<Real>) -> Result<Vector3<Real>, MeshError> {
    let length_squared = n.norm_squared();
    if length_squared > 0.0 && length_squared.is_finite() {
        Ok(n / length_squared.sqrt())
    } else {
        Err(MeshError::InvalidAxis {
            axis: 'n',
            length_squared,
        })
    }
}

fn difference(start: &Point3<Real>, end: &Point3<Real>) -> Result<Vector3<Real>, MeshError> {
    let d = *end - *start;
    let distance_squared = d.norm_squared();
    if !(distance_squared > min_vertex_distance_squared()) {
        return Err(MeshError::PointsTooClose { distance_squared });
    }
    Ok(d / distance_squared.sqrt())
}

impl PlanarCoordinateSystem {
    /// Frame at the world origin with unit axis `x` in the plane with normal `n`.
    pub fn with_x(x: Vector3<Real>, n: Vector3<Real>) -> Result<Self, MeshError> {
        Self::with_x_at(Point3::origin(), x, n)
    }

    /// Frame at `p` with unit axis `x` in the plane with normal `n`.
    pub fn with_x_at(p: Point3<Real>, x: Vector3<Real>, n: Vector3<Real>) -> Result<Self, MeshError> {
        check_unit('x', &x)?;
        let n = unit_normal(n)?;
        let y = normalized('y', n.cross(&x))?;
        Ok(PlanarCoordinateSystem {
            p,
            x: y.cross(&n),
            y,
        })
    }

    /// Frame at `x_start` whose x axis points towards `x_end`.
    pub fn with_x_difference(
        x_start: Point3<Real>,
        x_end: Point3<Real>,
        n: Vector3<Real>,
    ) -> Result<Self, MeshError> {
        let x = difference(&x_start, &x_end)?;
        Self::with_x_at(x_start, x, n)
    }

    /// Frame at the world origin with unit axis `y` in the plane with normal `n`.
    pub fn with_y(y: Vector3<Real>, n: Vector3<Real>) -> Result<Self, MeshError> {
        Self::with_y_at(Point3::origin(), y, n)
    }

    /// Frame at `p` with unit axis `y` in the plane with normal `n`.
    pub fn with_y_at(p: Point3<Real>, y: Vector3<Real>, n: Vector3<Real>) -> Result<Self, MeshError> {
        check_unit('y', &y)?;
        let n = unit_normal(n)?;
        let x = normalized('x', y.cross(&n))?;
        Ok(PlanarCoordinateSystem {
            p,
            x,
            y: n.cross(&x),
        })
    }

    /// Frame at `y_start` whose y axis points towards `y_end`.
    pub fn with_y_difference(
        y_start: Point3<Real>,
        y_end: Point3<Real>,
        n: Vector3<Real>,
    ) -> Result<Self, MeshError> {
        let y = difference(&y_start, &y_end)?;
        Self::with_y_at(y_start, y, n)
    }

    /// Frame fitted to a polygon given by its positions in order.
    ///
    /// The normal is computed with Newell's method, so mildly non-planar input
    /// is fine. The origin is the first position and the y axis points along
    /// the general direction of the polygon as seen from it. Needs at least 3
    /// positions that are distinguishable from the first one.
    pub fn for_polygon<I>(points: I) -> Result<Self, MeshError>
    where
        I: IntoIterator<Item = Point3<Real>>,
    {
        let mut points = points.into_iter();
        let first = points.next().ok_or(MeshError::DegeneratePolygon { valid: 0 })?;
        let min_distance_squared = min_vertex_distance_squared();

        let mut last = first;
        let mut valid = Vector3::zeros();
        let mut dir_sum = Vector3::zeros();
        let mut n = Vector3::zeros();

        let mut num_valid = 1;
        for p in points {
            add_to_normal(&mut n, &last, &p);
            last = p;

            let offset = p - first;
            dir_sum += offset;

            // count only positions that differ from 'first'
            if offset.norm_squared() > min_distance_squared {
                valid = offset;
                num_valid += 1;
            }
        }

        if num_valid < 3 {
            return Err(MeshError::DegeneratePolygon { valid: num_valid });
        }

        // closing segment
        add_to_normal(&mut n, &last, &first);
        let n = unit_normal(n).map_err(|_| MeshError::DegeneratePolygon { valid: num_valid })?;

        // symmetric polygons can cancel out the direction sum
        if dir_sum.norm_squared() <= min_distance_squared {
            dir_sum = valid;
        }

        Self::with_y_difference(first, first + dir_sum, n)
    }

    /// Frame fitted to the vertex positions of `face`.
    pub fn for_face(mesh: &BMesh, face: Face) -> Result<Self, MeshError> {
        Self::for_polygon(
            mesh.face_vertices(face)
                .filter_map(|vertex| mesh.position(vertex)),
        )
    }

    pub const fn origin(&self) -> Point3<Real> {
        self.p
    }

    pub const fn x_axis(&self) -> Vector3<Real> {
        self.x
    }

    pub const fn y_axis(&self) -> Vector3<Real> {
        self.y
    }

    /// Unit plane normal, `x × y`.
    pub fn normal(&self) -> Vector3<Real> {
        self.x.cross(&self.y)
    }

    /// World position -> local 2D coordinates.
    pub fn project(&self, v: &Point3<Real>) -> Vector2<Real> {
        let diff = *v - self.p;
        Vector2::new(diff.dot(&self.x), diff.dot(&self.y))
    }

    /// Local 2D coordinates -> world position in the plane.
    pub fn unproject(&self, v: &Vector2<Real>) -> Point3<Real> {
        self.p + self.x * v.x + self.y * v.y
    }

    /// Rotate both axes about the plane normal by `angle` radians.
    pub fn rotate(&mut self, angle: Real) {
        let axis = Unit::new_normalize(self.normal());
        let rotation = UnitQuaternion::from_axis_angle(&axis, angle);
        self.x = rotation * self.x;
        self.y = rotation * self.y;
    }
}

impl fmt::Display for PlanarCoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PlanarCoordinateSystem{{x: ({}, {}, {}) ({}), y: ({}, {}, {}) ({}), p: ({}, {}, {})}}",
            self.x.x,
            self.x.y,
            self.x.z,
            self.x.norm(),
            self.y.x,
            self.y.y,
            self.y.z,
            self.y.norm(),
            self.p.x,
            self.p.y,
            self.p.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotate_quarter_turn() {
        let mut pcs = PlanarCoordinateSystem::default();
        pcs.rotate(crate::float_types::FRAC_PI_2);
        assert_relative_eq!(pcs.x_axis(), Vector3::y(), epsilon = 1e-6);
        assert_relative_eq!(pcs.y_axis(), -Vector3::x(), epsilon = 1e-6);
        assert_relative_eq!(pcs.normal(), Vector3::z(), epsilon = 1e-6);
    }

    #[test]
    fn rotation_uses_frame_normal() {
        let mut pcs = PlanarCoordinateSystem::with_x(Vector3::y(), Vector3::x()).unwrap();
        pcs.rotate(0.3);
        assert_relative_eq!(pcs.normal(), Vector3::x(), epsilon = 1e-6);
        assert_relative_eq!(pcs.x_axis().dot(&Vector3::x()), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn display_lists_axes() {
        let text = PlanarCoordinateSystem::default().to_string();
        assert!(text.starts_with("PlanarCoordinateSystem{x: (1, 0, 0) (1)"));
    }
}
