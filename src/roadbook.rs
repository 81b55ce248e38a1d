//! In-memory roadbook: the default waypoint registry.
//!
//! Keeps registered waypoint geodata keyed by handle, the aggregate route
//! distance, and which waypoint is currently being edited. A real host
//! would back this with its roadbook document.

use std::collections::HashMap;

use crate::geodata::WaypointGeodata;
use crate::traits::{WaypointId, WaypointRegistry};

#[derive(Debug, Default)]
pub struct InMemoryRoadbook {
    waypoints: HashMap<WaypointId, WaypointGeodata>,
    next_id: u64,
    total_km: f64,
    currently_editing: Option<WaypointId>,
}

impl InMemoryRoadbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoint(&self, id: WaypointId) -> Option<&WaypointGeodata> {
        self.waypoints.get(&id)
    }

    pub fn total_km(&self) -> f64 {
        self.total_km
    }

    pub fn currently_editing(&self) -> Option<&WaypointGeodata> {
        self.currently_editing.and_then(|id| self.waypoints.get(&id))
    }

    pub fn set_currently_editing(&mut self, id: Option<WaypointId>) {
        self.currently_editing = id;
    }
}

impl WaypointRegistry for InMemoryRoadbook {
    fn register_waypoint(&mut self, geodata: &WaypointGeodata) -> WaypointId {
        let id = WaypointId(self.next_id);
        self.next_id += 1;
        self.waypoints.insert(id, geodata.clone());
        id
    }

    fn update_waypoint(&mut self, id: WaypointId, geodata: &WaypointGeodata) {
        if let Some(entry) = self.waypoints.get_mut(&id) {
            *entry = geodata.clone();
        }
    }

    fn unregister_waypoint(&mut self, id: WaypointId) {
        self.waypoints.remove(&id);
        if self.currently_editing == Some(id) {
            self.currently_editing = None;
        }
    }

    fn recompute_total_distance(&mut self) {
        self.total_km = self.waypoints.values().map(|w| w.km_from_prev).sum();
    }
}
