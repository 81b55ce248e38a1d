//! Route editing error kinds.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The insertion locator exhausted its bounded retries: the route has
    /// fewer than two points or the point is too far from every segment.
    #[error("no insertion point found after {attempts} attempts")]
    NoInsertionPointFound { attempts: usize },

    /// An operation addressed an index outside the route.
    #[error("index {index} out of bounds for route of length {len}")]
    InvalidIndex { index: usize, len: usize },
}
