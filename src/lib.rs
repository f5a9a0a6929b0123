//! Relief Radar - relevance filtering engine for disaster-relief posts
//!
//! Decides which relief requests a user sees by combining province/ward
//! matching with great-circle distance from a saved or live position, and
//! keeps the cascading province → ward selection consistent while ward lists
//! load over the network.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{distance::{distance_km, haversine_distance}, relevance::filter_posts, RegionSelectionCoordinator};
pub use models::{Coordinate, FilterProfile, FilterSpec, Region, RelievePost, SelectionState};
pub use services::{PreferenceSynchronizer, RegionCatalog, SelectionSession};
