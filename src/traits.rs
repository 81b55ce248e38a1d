//! Capability seams consumed by the route engine.
//!
//! These are intentionally minimal and host-agnostic. The crate ships a
//! default implementation for each (`GreatCircleGeometry`,
//! `DirectionsClient`, `InMemoryRoadbook`); embedding applications can
//! substitute their own.

use crate::geodata::WaypointGeodata;
use crate::latlng::LatLng;

/// Stable handle issued by a [`WaypointRegistry`] for a registered waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaypointId(pub u64);

/// Spherical geometry primitives.
pub trait GeometryProvider {
    /// Decode an encoded polyline into a coordinate sequence.
    ///
    /// Malformed input decodes to an empty sequence.
    fn decode_path(&self, encoded: &str) -> Vec<LatLng>;

    /// Douglas-Peucker simplification. `tolerance` is in degrees.
    fn simplify(&self, points: &[LatLng], tolerance: f64) -> Vec<LatLng>;

    /// Length of a point sequence along great circles, in meters.
    fn spherical_length(&self, points: &[LatLng]) -> f64;

    /// Initial bearing from `a` to `b` in degrees, range [-180, 180].
    fn spherical_bearing(&self, a: LatLng, b: LatLng) -> f64;

    /// Whether `point` lies within `tolerance` degrees of segment `a`-`b`.
    fn point_on_segment(&self, point: LatLng, a: LatLng, b: LatLng, tolerance: f64) -> bool;
}

/// Fetches a routed path between two points.
///
/// Returns the encoded polyline of each routed step, in travel order.
/// Any upstream failure is absorbed into an empty result; the engine
/// treats that as "nothing to append" and leaves the route untouched.
pub trait PathFetcher {
    fn fetch_path(&self, origin: LatLng, destination: LatLng) -> Vec<String>;
}

/// External roadbook tracking promoted waypoints.
pub trait WaypointRegistry {
    /// Register a newly promoted waypoint and return its handle.
    fn register_waypoint(&mut self, geodata: &WaypointGeodata) -> WaypointId;

    /// Replace the stored geodata for an existing waypoint.
    fn update_waypoint(&mut self, id: WaypointId, geodata: &WaypointGeodata);

    /// Drop a demoted waypoint.
    fn unregister_waypoint(&mut self, id: WaypointId);

    /// Recompute aggregate totals after a batch of updates.
    fn recompute_total_distance(&mut self);
}
