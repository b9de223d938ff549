//! Polygon normals with Newell's method

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// Accumulate the contribution of the polygon edge `last -> current` into `n`.
///
/// Summed over all edges of a closed polygon (including the edge back to the
/// first point), `n` points along the normal given by the right-hand rule
/// and its length is twice the polygon's projected area.
#[inline]
pub fn add_to_normal(n: &mut Vector3<Real>, last: &Point3<Real>, current: &Point3<Real>) {
    n.x += (last.y - current.y) * (last.z + current.z);
    n.y += (last.z - current.z) * (last.x + current.x);
    n.z += (last.x - current.x) * (last.y + current.y);
}

/// Unnormalized Newell normal of a closed polygon.
///
/// Returns the zero vector for fewer than 3 points.
pub fn newell_normal<I>(points: I) -> Vector3<Real>
where
    I: IntoIterator<Item = Point3<Real>>,
{
    let mut n = Vector3::zeros();
    let mut points = points.into_iter();
    let Some(first) = points.next() else {
        return n;
    };

    let mut last = first;
    for p in points {
        add_to_normal(&mut n, &last, &p);
        last = p;
    }
    add_to_normal(&mut n, &last, &first);
    n
}
