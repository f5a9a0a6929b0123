// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod relevance;
pub mod selection;

pub use distance::{distance_km, haversine_distance, is_within_radius};
pub use filters::{address_contains, matches_administrative, matches_distance};
pub use relevance::{filter_posts, filter_posts_with_stats, FilterResult};
pub use selection::{RegionSelectionCoordinator, SavedSelection, SelectionEvent, Transition, WardRequest};
