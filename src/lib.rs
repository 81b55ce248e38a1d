//! Editable polyline route engine.
//!
//! Maintains an ordered sequence of geographic points with per-point
//! metadata, a subset of which are promoted to waypoints carrying derived
//! navigation data (heading, turn angle, cumulative distances). Rendering,
//! marker styling, and the roadbook document are external concerns that
//! plug in through the seams in [`traits`].

pub mod delete_queue;
pub mod directions;
pub mod error;
pub mod geodata;
pub mod geometry;
pub mod insertion;
pub mod latlng;
pub mod roadbook;
pub mod route;
pub mod traits;
