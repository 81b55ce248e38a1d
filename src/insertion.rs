//! Locates the insertion index for a point dropped onto an existing path.

use tracing::debug;

use crate::error::RouteError;
use crate::latlng::LatLng;
use crate::traits::GeometryProvider;

/// Bounded retry policy for the growing-tolerance segment scan.
///
/// Each failed pass over the route doubles the tolerance; the search gives
/// up after `max_attempts` passes instead of widening forever.
#[derive(Debug, Clone, Copy)]
pub struct InsertionPolicy {
    pub max_attempts: usize,
}

impl Default for InsertionPolicy {
    fn default() -> Self {
        Self { max_attempts: 16 }
    }
}

/// Edge tolerance derived from a map zoom level, in degrees.
///
/// Falls off super-exponentially with zoom so the hit area tracks the
/// on-screen size of a segment.
pub fn edge_tolerance_for_zoom(zoom: f64) -> f64 {
    zoom.powf(-(zoom / 5.0))
}

/// Finds the index a new point belongs at by testing consecutive route
/// segments, doubling the tolerance after each full miss.
///
/// Returns the index of the trailing point of the first matching segment,
/// which is where the new point is inserted. Routes with fewer than two
/// points can never match.
pub fn insertion_index<G: GeometryProvider>(
    geometry: &G,
    points: &[LatLng],
    point: LatLng,
    base_tolerance: f64,
    policy: &InsertionPolicy,
) -> Result<usize, RouteError> {
    if points.len() < 2 {
        return Err(RouteError::NoInsertionPointFound { attempts: 0 });
    }

    let mut tolerance = base_tolerance;
    for attempt in 0..policy.max_attempts {
        for i in 1..points.len() {
            if geometry.point_on_segment(point, points[i - 1], points[i], tolerance) {
                debug!(index = i, attempt, tolerance, "insertion segment located");
                return Ok(i);
            }
        }
        tolerance *= 2.0;
    }

    Err(RouteError::NoInsertionPointFound {
        attempts: policy.max_attempts,
    })
}
