// Our Real scalar type:
#[cfg(feature = "f32")]
pub type Real = f32;
#[cfg(feature = "f64")]
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Maximum deviation of a basis axis from unit length, compared squared
/// against `|1 - |axis|²|`.
pub const AXIS_LENGTH_EPSILON: Real = 0.001;
/// Squared form of [`AXIS_LENGTH_EPSILON`].
pub const AXIS_LENGTH_EPSILON_SQUARED: Real = AXIS_LENGTH_EPSILON * AXIS_LENGTH_EPSILON;

/// Lazily-initialized minimum distance for two positions to count as distinct.
/// Defaults to `1e-5`, but can be overridden:
///  1) **Build-time**: set env var `LOOPMESH_MIN_VERTEX_DISTANCE` (e.g. `LOOPMESH_MIN_VERTEX_DISTANCE=1e-4 cargo build`)
///  2) **Runtime**: call [`set_min_vertex_distance`] once before using the library
static MIN_VERTEX_DISTANCE_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
const fn default_min_vertex_distance() -> Real {
    1e-5
}

/// Returns the current minimum vertex distance.
/// If not set yet, it tries `LOOPMESH_MIN_VERTEX_DISTANCE` (parsed as the active `Real`) and
/// falls back to the default.
pub fn min_vertex_distance() -> Real {
    *MIN_VERTEX_DISTANCE_CELL.get_or_init(|| {
        // Compile-time env if provided, inherited by dependencies
        if let Some(environment_variable) = option_env!("LOOPMESH_MIN_VERTEX_DISTANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_min_vertex_distance()
    })
}

/// Squared form of [`min_vertex_distance`], the value actually compared against.
#[inline]
pub fn min_vertex_distance_squared() -> Real {
    let d = min_vertex_distance();
    d * d
}

/// Set the minimum vertex distance programmatically once (subsequent calls are ignored).
/// Call near program start: `loopmesh::float_types::set_min_vertex_distance(1e-4);`
pub fn set_min_vertex_distance(value: Real) {
    let _ = MIN_VERTEX_DISTANCE_CELL.set(value.max(Real::EPSILON));
}

// Pi
/// Archimedes' constant (π)
#[cfg(feature = "f32")]
pub const PI: Real = core::f32::consts::PI;
/// Archimedes' constant (π)
#[cfg(feature = "f64")]
pub const PI: Real = core::f64::consts::PI;

// Frac Pi 2
/// π/2
#[cfg(feature = "f32")]
pub const FRAC_PI_2: Real = core::f32::consts::FRAC_PI_2;
/// π/2
#[cfg(feature = "f64")]
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;
