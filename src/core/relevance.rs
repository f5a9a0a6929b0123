use crate::models::{domain::non_empty, FilterSpec, RelievePost};
use crate::core::filters::{matches_administrative, matches_distance};

/// Result of running the relevance pipeline
#[derive(Debug)]
pub struct FilterResult {
    pub posts: Vec<RelievePost>,
    pub total_candidates: usize,
    pub distance_filter_active: bool,
}

/// Decide which posts are relevant for the given filter spec
///
/// # Pipeline Stages
/// 1. Administrative match (province, then ward) on the address text
/// 2. Distance narrowing, only when a location and a positive radius are set
///
/// Both stages are conjunctive. The output is an order-preserving subsequence
/// of `posts`; with no criteria set it is `posts` unchanged.
pub fn filter_posts(posts: &[RelievePost], spec: &FilterSpec) -> Vec<RelievePost> {
    filter_posts_with_stats(posts, spec).posts
}

/// Same as [`filter_posts`], also reporting what the pipeline saw
pub fn filter_posts_with_stats(posts: &[RelievePost], spec: &FilterSpec) -> FilterResult {
    let total_candidates = posts.len();
    let distance = spec.distance_criteria();

    if spec.is_empty() {
        return FilterResult {
            posts: posts.to_vec(),
            total_candidates,
            distance_filter_active: false,
        };
    }

    let province = non_empty(&spec.province_name);
    let ward = non_empty(&spec.ward_name);

    let filtered: Vec<RelievePost> = posts
        .iter()
        // Stage 1: administrative match
        .filter(|post| matches_administrative(post, province, ward))
        // Stage 2: distance narrowing
        .filter(|post| match &distance {
            Some((center, radius_km)) => matches_distance(post, center, *radius_km),
            None => true,
        })
        .cloned()
        .collect();

    tracing::debug!(
        "Relevance filter kept {} of {} posts (province: {:?}, ward: {:?}, distance: {:?})",
        filtered.len(),
        total_candidates,
        province,
        ward,
        distance
    );

    FilterResult {
        posts: filtered,
        total_candidates,
        distance_filter_active: distance.is_some(),
    }
}
