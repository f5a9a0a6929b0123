use crate::models::{Coordinate, RelievePost};

/// Case-insensitive substring test against a post's free-text address
///
/// Matching is on names, not codes: a ward whose name happens to appear inside
/// an unrelated address will match too.
#[inline]
pub fn address_contains(post: &RelievePost, needle: &str) -> bool {
    post.location
        .address_text
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

/// Check if a post matches the administrative criteria
///
/// This is Stage 1 of the relevance pipeline. Empty or absent names impose no
/// constraint; province and ward are conjunctive.
#[inline]
pub fn matches_administrative(
    post: &RelievePost,
    province_name: Option<&str>,
    ward_name: Option<&str>,
) -> bool {
    if let Some(province) = province_name.filter(|p| !p.is_empty()) {
        if !address_contains(post, province) {
            return false;
        }
    }

    if let Some(ward) = ward_name.filter(|w| !w.is_empty()) {
        if !address_contains(post, ward) {
            return false;
        }
    }

    true
}

/// Check if a post is within `radius_km` of `center`
///
/// This is Stage 2 - the distance narrowing.
#[inline]
pub fn matches_distance(post: &RelievePost, center: &Coordinate, radius_km: f64) -> bool {
    super::distance::is_within_radius(center, &post.location.coordinate, radius_km)
}
