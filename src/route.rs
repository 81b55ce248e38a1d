//! Route store: the ordered point sequence and its per-point metadata.
//!
//! Each route point and its editing metadata live together in one
//! [`Vertex`], so the point and vertex sequences can never diverge in
//! length. Every vertex also carries its `route_point_index`, kept equal
//! to its position by explicit shifting on insert and delete; handles the
//! host hands out (and registry records) stay meaningful across edits.

use tracing::debug;

use crate::error::RouteError;
use crate::geodata::{self, WaypointGeodata};
use crate::insertion::{self, InsertionPolicy};
use crate::latlng::LatLng;
use crate::traits::{GeometryProvider, PathFetcher, WaypointId, WaypointRegistry};

/// Default Douglas-Peucker tolerance for decoded paths, in degrees.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 7e-9;

/// Auxiliary visual annotation attached to a waypoint.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bubble {
    pub radius_m: f64,
    pub fill: String,
}

/// One route point plus its editing metadata.
#[derive(Debug, Clone)]
pub struct Vertex {
    point: LatLng,
    route_point_index: usize,
    waypoint: Option<WaypointId>,
    bubble: Option<Bubble>,
}

impl Vertex {
    pub fn point(&self) -> LatLng {
        self.point
    }

    pub fn route_point_index(&self) -> usize {
        self.route_point_index
    }

    pub fn waypoint(&self) -> Option<WaypointId> {
        self.waypoint
    }

    pub fn bubble(&self) -> Option<&Bubble> {
        self.bubble.as_ref()
    }

    pub fn is_waypoint(&self) -> bool {
        self.waypoint.is_some()
    }
}

/// Owns the editable route and drives the waypoint registry.
///
/// All mutation is synchronous through `&mut self`; a host that edits from
/// multiple threads must serialize access to one store.
#[derive(Debug)]
pub struct RouteStore<G, R> {
    geometry: G,
    registry: R,
    vertices: Vec<Vertex>,
}

impl<G: GeometryProvider, R: WaypointRegistry> RouteStore<G, R> {
    pub fn new(geometry: G, registry: R) -> Self {
        Self {
            geometry,
            registry,
            vertices: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The route as a bare point sequence, in path order.
    pub fn points(&self) -> Vec<LatLng> {
        self.vertices.iter().map(|v| v.point).collect()
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    /// Appends a point to the end of the route.
    ///
    /// The first point ever added to an empty route is promoted to a
    /// waypoint immediately. Returns the new vertex index.
    pub fn add_route_point(&mut self, point: LatLng) -> usize {
        let index = self.vertices.len();
        self.vertices.push(Vertex {
            point,
            route_point_index: index,
            waypoint: None,
            bubble: None,
        });
        debug!(index, "route point appended");

        if self.vertices.len() == 1 {
            self.promote_at(0);
        }

        self.assert_indices();
        index
    }

    /// Inserts a point at `index` (`0 ≤ index ≤ len`) and shifts the
    /// route-point index of every subsequent vertex up by one.
    pub fn insert_point_at_index(&mut self, point: LatLng, index: usize) -> Result<usize, RouteError> {
        if index > self.vertices.len() {
            return Err(RouteError::InvalidIndex {
                index,
                len: self.vertices.len(),
            });
        }

        self.vertices.insert(
            index,
            Vertex {
                point,
                route_point_index: index,
                waypoint: None,
                bubble: None,
            },
        );
        self.shift_indices_from(index + 1, 1);
        debug!(index, "route point inserted");

        self.assert_indices();
        Ok(index)
    }

    /// Inserts a point onto the segment it was dropped on, locating the
    /// index with a bounded growing-tolerance scan.
    pub fn insert_point_between_existing(
        &mut self,
        point: LatLng,
        base_tolerance: f64,
        policy: &InsertionPolicy,
    ) -> Result<usize, RouteError> {
        let points = self.points();
        let index = insertion::insertion_index(&self.geometry, &points, point, base_tolerance, policy)?;
        self.insert_point_at_index(point, index)
    }

    /// Replaces the point at `index` in place. Indices are unaffected.
    pub fn update_vertex_position(&mut self, index: usize, point: LatLng) -> Result<(), RouteError> {
        self.check_index(index)?;
        self.vertices[index].point = point;
        Ok(())
    }

    /// Promotes the vertex at `index` to a waypoint, registering its
    /// geodata. A no-op returning the existing handle when already promoted.
    pub fn promote_to_waypoint(&mut self, index: usize) -> Result<WaypointId, RouteError> {
        self.check_index(index)?;
        Ok(self.promote_at(index))
    }

    fn promote_at(&mut self, index: usize) -> WaypointId {
        if let Some(id) = self.vertices[index].waypoint {
            return id;
        }
        let points = self.points();
        let geodata = self.geodata_at(&points, index);
        let id = self.registry.register_waypoint(&geodata);
        self.vertices[index].waypoint = Some(id);
        debug!(index, waypoint = id.0, "vertex promoted to waypoint");
        id
    }

    /// Demotes the waypoint at `index`: drops its bubble and unregisters
    /// it. A no-op when the vertex is not a waypoint.
    pub fn demote_waypoint(&mut self, index: usize) -> Result<(), RouteError> {
        self.check_index(index)?;
        let vertex = &mut self.vertices[index];
        if let Some(id) = vertex.waypoint.take() {
            vertex.bubble = None;
            self.registry.unregister_waypoint(id);
            debug!(index, waypoint = id.0, "waypoint demoted");
        }
        Ok(())
    }

    /// Removes the vertex and its route point, demoting first when it is a
    /// waypoint, and shifts subsequent indices down by one. Returns the
    /// removed point.
    pub fn delete_vertex(&mut self, index: usize) -> Result<LatLng, RouteError> {
        self.check_index(index)?;
        self.demote_waypoint(index)?;

        let removed = self.vertices.remove(index);
        self.shift_indices_from(index, -1);
        debug!(index, "route point deleted");

        self.assert_indices();
        Ok(removed.point)
    }

    /// Attaches a bubble annotation to the waypoint at `index`.
    ///
    /// Returns `Ok(false)` without attaching when the vertex is not a
    /// waypoint; bubbles only exist alongside one.
    pub fn set_waypoint_bubble(
        &mut self,
        index: usize,
        radius_m: f64,
        fill: &str,
    ) -> Result<bool, RouteError> {
        self.check_index(index)?;
        let vertex = &mut self.vertices[index];
        if vertex.waypoint.is_none() {
            return Ok(false);
        }
        vertex.bubble = Some(Bubble {
            radius_m,
            fill: fill.to_string(),
        });
        Ok(true)
    }

    /// Decodes an encoded path, simplifies it, and appends every simplified
    /// point; the last one is promoted to a waypoint. Finishes with a full
    /// waypoint refresh. Returns the number of points appended.
    pub fn append_decoded_path(&mut self, encoded: &str, simplification_tolerance: f64) -> usize {
        let decoded = self.geometry.decode_path(encoded);
        let simplified = self.geometry.simplify(&decoded, simplification_tolerance);
        if simplified.is_empty() {
            return 0;
        }

        let mut last = 0;
        for point in &simplified {
            last = self.add_route_point(*point);
        }
        self.promote_at(last);
        self.refresh_all_waypoints();

        simplified.len()
    }

    /// Fetches a routed path from the current route end to `destination`
    /// and appends each returned step.
    ///
    /// Returns `false` without touching the route when it is empty or the
    /// fetch produced nothing (including silently absorbed upstream errors).
    pub fn extend_with_fetched_path<F: PathFetcher>(
        &mut self,
        fetcher: &F,
        destination: LatLng,
        simplification_tolerance: f64,
    ) -> bool {
        let Some(origin) = self.vertices.last().map(|v| v.point) else {
            return false;
        };

        let steps = fetcher.fetch_path(origin, destination);
        if steps.is_empty() {
            return false;
        }

        let mut appended = 0;
        for encoded in &steps {
            appended += self.append_decoded_path(encoded, simplification_tolerance);
        }
        appended > 0
    }

    /// Recomputes geodata for every promoted vertex, pushes the updates to
    /// the registry, and has it recompute its aggregate totals.
    pub fn refresh_all_waypoints(&mut self) {
        let points = self.points();
        for index in 0..self.vertices.len() {
            if let Some(id) = self.vertices[index].waypoint {
                let geodata = self.geodata_at(&points, index);
                self.registry.update_waypoint(id, &geodata);
            }
        }
        self.registry.recompute_total_distance();
    }

    /// Index of the nearest preceding vertex carrying a waypoint, scanning
    /// backward from `index`. Index 0 is the fallback even when it carries
    /// no waypoint.
    pub fn previous_waypoint_index(&self, index: usize) -> usize {
        for i in (1..index).rev() {
            if self.vertices[i].waypoint.is_some() {
                return i;
            }
        }
        0
    }

    /// Assembles the derived navigation snapshot for the vertex at `index`.
    pub fn waypoint_geodata(&self, index: usize) -> Result<WaypointGeodata, RouteError> {
        self.check_index(index)?;
        Ok(self.geodata_at(&self.points(), index))
    }

    /// Raw bearing of the segment arriving at `index`, a convenience for
    /// the registry's currently-editing waypoint. `None` at the route start.
    pub fn approach_bearing(&self, index: usize) -> Option<f64> {
        if index == 0 || index >= self.vertices.len() {
            return None;
        }
        Some(
            self.geometry
                .spherical_bearing(self.vertices[index - 1].point, self.vertices[index].point),
        )
    }

    fn geodata_at(&self, points: &[LatLng], index: usize) -> WaypointGeodata {
        let heading = geodata::heading(&self.geometry, points, index);
        WaypointGeodata {
            position: points[index],
            route_point_index: index,
            km_from_start: geodata::distance_between(&self.geometry, points, 0, index),
            km_from_prev: geodata::distance_between(
                &self.geometry,
                points,
                self.previous_waypoint_index(index),
                index,
            ),
            heading,
            relative_angle: geodata::relative_angle(&self.geometry, points, index, heading),
        }
    }

    fn shift_indices_from(&mut self, start: usize, delta: isize) {
        for vertex in self.vertices.iter_mut().skip(start) {
            // an underflow here is an index-consistency bug; let
            // assert_indices trip on it rather than clamping it away
            vertex.route_point_index = vertex.route_point_index.wrapping_add_signed(delta);
        }
    }

    fn check_index(&self, index: usize) -> Result<(), RouteError> {
        if index < self.vertices.len() {
            Ok(())
        } else {
            Err(RouteError::InvalidIndex {
                index,
                len: self.vertices.len(),
            })
        }
    }

    fn assert_indices(&self) {
        debug_assert!(
            self.vertices
                .iter()
                .enumerate()
                .all(|(i, v)| v.route_point_index == i),
            "route point indices out of sync with positions"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GreatCircleGeometry;
    use crate::roadbook::InMemoryRoadbook;

    fn store() -> RouteStore<GreatCircleGeometry, InMemoryRoadbook> {
        RouteStore::new(GreatCircleGeometry, InMemoryRoadbook::new())
    }

    fn equator(lng: f64) -> LatLng {
        LatLng::new(0.0, lng)
    }

    fn assert_consistent<G: GeometryProvider, R: WaypointRegistry>(store: &RouteStore<G, R>) {
        for (i, vertex) in store.vertices().iter().enumerate() {
            assert_eq!(vertex.route_point_index(), i, "vertex {i} out of sync");
        }
    }

    #[test]
    fn test_first_point_becomes_waypoint() {
        let mut store = store();
        let index = store.add_route_point(equator(0.0));
        assert_eq!(index, 0);
        assert!(store.vertex(0).unwrap().is_waypoint());
        assert_eq!(store.registry().len(), 1);

        store.add_route_point(equator(1.0));
        assert!(!store.vertex(1).unwrap().is_waypoint());
        assert_eq!(store.registry().len(), 1);
    }

    #[test]
    fn test_indices_stay_dense_across_interleaved_edits() {
        let mut store = store();
        for i in 0..5 {
            store.add_route_point(equator(i as f64));
        }
        store.insert_point_at_index(equator(0.5), 1).unwrap();
        assert_consistent(&store);

        store.delete_vertex(3).unwrap();
        assert_consistent(&store);

        store.insert_point_at_index(equator(9.0), store.len()).unwrap();
        store.delete_vertex(0).unwrap();
        assert_consistent(&store);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_front_deletions_shift_indices_to_zero() {
        // deleting at the front drives every remaining index through the
        // decrement boundary; indices must stay dense, not pinned
        let mut store = store();
        for i in 0..4 {
            store.add_route_point(equator(i as f64));
        }
        store.delete_vertex(0).unwrap();
        store.delete_vertex(0).unwrap();
        assert_consistent(&store);
        assert_eq!(store.vertex(0).unwrap().point(), equator(2.0));
        assert_eq!(store.vertex(1).unwrap().point(), equator(3.0));
    }

    #[test]
    fn test_insert_then_delete_round_trips() {
        let mut store = store();
        for i in 0..4 {
            store.add_route_point(equator(i as f64));
        }
        let before = store.points();

        store.insert_point_at_index(equator(1.5), 2).unwrap();
        assert_eq!(store.len(), 5);
        store.delete_vertex(2).unwrap();

        assert_eq!(store.points(), before);
        assert_consistent(&store);
    }

    #[test]
    fn test_insert_at_invalid_index_rejected() {
        let mut store = store();
        store.add_route_point(equator(0.0));
        let result = store.insert_point_at_index(equator(1.0), 5);
        assert_eq!(result, Err(RouteError::InvalidIndex { index: 5, len: 1 }));
    }

    #[test]
    fn test_insert_between_existing_points() {
        let mut store = store();
        for i in 0..3 {
            store.add_route_point(equator(i as f64));
        }
        let index = store
            .insert_point_between_existing(equator(1.5), 1e-6, &InsertionPolicy::default())
            .unwrap();
        assert_eq!(index, 2);
        assert_eq!(store.vertex(2).unwrap().point(), equator(1.5));
        assert_consistent(&store);
    }

    #[test]
    fn test_promote_is_idempotent() {
        let mut store = store();
        store.add_route_point(equator(0.0));
        store.add_route_point(equator(1.0));

        let first = store.promote_to_waypoint(1).unwrap();
        let geodata_once = store.registry().waypoint(first).cloned();
        let second = store.promote_to_waypoint(1).unwrap();

        assert_eq!(first, second);
        assert_eq!(store.registry().len(), 2);
        assert_eq!(store.registry().waypoint(first).cloned(), geodata_once);
    }

    #[test]
    fn test_demote_clears_bubble_and_registry() {
        let mut store = store();
        store.add_route_point(equator(0.0));
        store.add_route_point(equator(1.0));

        store.promote_to_waypoint(1).unwrap();
        assert!(store.set_waypoint_bubble(1, 500.0, "#ff4200").unwrap());

        store.demote_waypoint(1).unwrap();
        assert!(!store.vertex(1).unwrap().is_waypoint());
        assert!(store.vertex(1).unwrap().bubble().is_none());
        assert_eq!(store.registry().len(), 1);

        // demoting again is a no-op
        store.demote_waypoint(1).unwrap();
        assert_eq!(store.registry().len(), 1);
    }

    #[test]
    fn test_bubble_requires_waypoint() {
        let mut store = store();
        store.add_route_point(equator(0.0));
        store.add_route_point(equator(1.0));

        assert!(!store.set_waypoint_bubble(1, 500.0, "#ff4200").unwrap());
        assert!(store.vertex(1).unwrap().bubble().is_none());
    }

    #[test]
    fn test_delete_waypoint_vertex_demotes_first() {
        let mut store = store();
        store.add_route_point(equator(0.0));
        store.add_route_point(equator(1.0));
        store.add_route_point(equator(2.0));
        store.promote_to_waypoint(1).unwrap();
        assert_eq!(store.registry().len(), 2);

        store.delete_vertex(1).unwrap();
        assert_eq!(store.registry().len(), 1);
        assert_eq!(store.len(), 2);
        assert_consistent(&store);
    }

    #[test]
    fn test_update_vertex_position_in_place() {
        let mut store = store();
        store.add_route_point(equator(0.0));
        store.add_route_point(equator(1.0));

        store.update_vertex_position(1, LatLng::new(0.5, 1.0)).unwrap();
        assert_eq!(store.vertex(1).unwrap().point(), LatLng::new(0.5, 1.0));
        assert_eq!(store.len(), 2);
        assert_consistent(&store);
    }

    #[test]
    fn test_previous_waypoint_index_scans_backward() {
        let mut store = store();
        for i in 0..5 {
            store.add_route_point(equator(i as f64));
        }
        store.promote_to_waypoint(2).unwrap();

        assert_eq!(store.previous_waypoint_index(4), 2);
        assert_eq!(store.previous_waypoint_index(2), 0);
        // index 0 is the fallback even without a waypoint scan hit
        assert_eq!(store.previous_waypoint_index(1), 0);
    }

    #[test]
    fn test_waypoint_geodata_distances() {
        let mut store = store();
        for i in 0..3 {
            store.add_route_point(equator(i as f64));
        }
        let geodata = store.waypoint_geodata(2).unwrap();

        assert_eq!(geodata.route_point_index, 2);
        assert!(geodata.km_from_start > 220.0 && geodata.km_from_start < 225.0);
        // no intermediate waypoint, so prev falls back to the start
        assert!((geodata.km_from_prev - geodata.km_from_start).abs() < 1e-9);
        assert_eq!(geodata.relative_angle, 0.0);
    }

    #[test]
    fn test_append_decoded_path_promotes_final_point() {
        let mut store = store();
        let line: geo::LineString<f64> =
            vec![(0.0, 0.0), (1.0, 0.0), (2.0, 1.0)].into_iter().collect();
        let encoded = polyline::encode_coordinates(line, 5).unwrap();

        let appended = store.append_decoded_path(&encoded, DEFAULT_SIMPLIFY_TOLERANCE);
        assert_eq!(appended, 3);
        assert_eq!(store.len(), 3);

        // first point by the empty-route rule, last by the append rule
        assert!(store.vertex(0).unwrap().is_waypoint());
        assert!(!store.vertex(1).unwrap().is_waypoint());
        assert!(store.vertex(2).unwrap().is_waypoint());
        assert_eq!(store.registry().len(), 2);
        assert_consistent(&store);
    }

    #[test]
    fn test_append_malformed_path_is_noop() {
        let mut store = store();
        store.add_route_point(equator(0.0));
        let before = store.points();

        let appended = store.append_decoded_path("", DEFAULT_SIMPLIFY_TOLERANCE);
        assert_eq!(appended, 0);
        assert_eq!(store.points(), before);
    }

    #[test]
    fn test_approach_bearing() {
        let mut store = store();
        store.add_route_point(equator(0.0));
        store.add_route_point(equator(1.0));

        assert!(store.approach_bearing(0).is_none());
        let bearing = store.approach_bearing(1).unwrap();
        assert!((bearing - 90.0).abs() < 0.01, "expected ~90, got {bearing}");
    }
}
