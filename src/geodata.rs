//! Derived navigation metadata for waypoints.
//!
//! Pure functions over the ordered route points; the store assembles them
//! into [`WaypointGeodata`] snapshots for the roadbook.

use serde::{Deserialize, Serialize};

use crate::latlng::LatLng;
use crate::traits::GeometryProvider;

/// Snapshot of a waypoint's derived navigation data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointGeodata {
    pub position: LatLng,
    pub route_point_index: usize,
    pub km_from_start: f64,
    /// Distance from the preceding waypoint (or the route start), in km.
    pub km_from_prev: f64,
    /// Compass heading toward the next route point, degrees [0, 360).
    pub heading: f64,
    /// Turn angle relative to the previous segment, degrees (-180, 180],
    /// positive = right turn. Zero at the route endpoints.
    pub relative_angle: f64,
}

/// Compass heading at `index`: the bearing toward the next route point,
/// normalized from the provider's [-180, 180] into [0, 360).
///
/// The next index is clamped (never wrapped) at the end of the route, so
/// the final point degenerates to a zero-length bearing.
pub fn heading<G: GeometryProvider>(geometry: &G, points: &[LatLng], index: usize) -> f64 {
    debug_assert!(index < points.len());
    let next = (index + 1).min(points.len() - 1);
    let raw = geometry.spherical_bearing(points[index], points[next]);
    if raw < 0.0 { raw + 360.0 } else { raw }
}

/// Turn angle at `index` relative to the heading of the previous segment.
///
/// `heading` is the already-normalized value from [`heading`]; the previous
/// segment's bearing is used raw, and the difference is folded into
/// (-180, 180]. Endpoints have no turn and return exactly 0.
pub fn relative_angle<G: GeometryProvider>(
    geometry: &G,
    points: &[LatLng],
    index: usize,
    heading: f64,
) -> f64 {
    debug_assert!(index < points.len());
    if index == 0 || index == points.len() - 1 {
        return 0.0;
    }

    let prev = geometry.spherical_bearing(points[index - 1], points[index]);
    let raw = heading - prev;
    if raw > 180.0 {
        raw - 360.0 // wrapped past north: left turn
    } else if raw < -180.0 {
        raw + 360.0 // right turn
    } else {
        raw
    }
}

/// Distance in kilometers along the route between two point indices,
/// inclusive of both endpoints.
pub fn distance_between<G: GeometryProvider>(
    geometry: &G,
    points: &[LatLng],
    start: usize,
    end: usize,
) -> f64 {
    debug_assert!(start <= end && end < points.len());
    geometry.spherical_length(&points[start..=end]) / 1000.0
}
