//! Two-click range deletion.

use tracing::debug;

use crate::error::RouteError;
use crate::route::RouteStore;
use crate::traits::{GeometryProvider, WaypointRegistry};

/// Outcome of a delete-queue selection, for the host to interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// First selection recorded; the vertex should be shown as pending.
    Marked { index: usize },
    /// Second selection consumed: the inclusive index range was removed
    /// and the host should leave delete mode.
    RangeDeleted { count: usize },
}

/// Two-step range-delete state machine.
///
/// The first selected index is parked; the second triggers an atomic
/// removal of the inclusive range between them, deleting from the higher
/// index down so the shift from one removal never displaces a later
/// target in the same batch. Completion refreshes all waypoints.
#[derive(Debug, Default)]
pub struct DeleteQueue {
    pending: Option<usize>,
}

impl DeleteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn select<G, R>(
        &mut self,
        store: &mut RouteStore<G, R>,
        index: usize,
    ) -> Result<DeleteOutcome, RouteError>
    where
        G: GeometryProvider,
        R: WaypointRegistry,
    {
        if index >= store.len() {
            self.pending = None;
            return Err(RouteError::InvalidIndex {
                index,
                len: store.len(),
            });
        }

        let Some(first) = self.pending.take() else {
            self.pending = Some(index);
            return Ok(DeleteOutcome::Marked { index });
        };

        if first >= store.len() {
            // the route shrank underneath a stale selection
            return Err(RouteError::InvalidIndex {
                index: first,
                len: store.len(),
            });
        }

        let (start, end) = if first <= index { (first, index) } else { (index, first) };
        for i in (start..=end).rev() {
            store.delete_vertex(i)?;
        }
        store.refresh_all_waypoints();

        let count = end - start + 1;
        debug!(start, end, count, "range delete completed");
        Ok(DeleteOutcome::RangeDeleted { count })
    }
}
