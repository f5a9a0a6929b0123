// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Coordinate, FilterProfile, FilterSpec, PostLocation, PostStatus, ProfilePatch, Region,
    RelievePost, SelectionSnapshot, SelectionState, Urgency,
};
pub use requests::{FilterPostsRequest, UpdatePreferencesRequest};
pub use responses::{ErrorResponse, FilterPostsResponse, HealthResponse, RegionListResponse};
