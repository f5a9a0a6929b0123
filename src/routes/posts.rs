use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::relevance::filter_posts_with_stats;
use crate::models::{FilterPostsRequest, FilterPostsResponse, FilterSpec};
use crate::routes::{error_body, AppState};
use crate::services::PreferenceSynchronizer;

/// Configure post routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/posts/filter", web::post().to(filter_posts))
        .route("/posts/{id}", web::get().to(get_post));
}

/// Filter posts endpoint
///
/// POST /api/v1/posts/filter
///
/// Request body:
/// ```json
/// {
///   "profileKey": "string",
///   "location": { "latitude": 21.02, "longitude": 105.85 },
///   "radiusKm": 5,
///   "provinceName": "string",
///   "wardName": "string"
/// }
/// ```
async fn filter_posts(state: web::Data<AppState>, req: web::Json<FilterPostsRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for filter_posts request: {:?}", errors);
        return HttpResponse::BadRequest().json(error_body(400, "Validation failed", errors.to_string()));
    }

    let req = req.into_inner();
    let mut spec = FilterSpec {
        user_location: req.location,
        radius_km: req.radius_km,
        province_name: req.province_name,
        ward_name: req.ward_name,
    };

    // Seed whatever the request left out from the saved profile
    if let Some(key) = req.profile_key.as_deref() {
        let synchronizer =
            PreferenceSynchronizer::new(state.profiles.clone(), key, state.default_radius_km);
        if let Some(profile) = synchronizer.load().await {
            spec.user_location = spec.user_location.or(profile.location);
            spec.radius_km = spec.radius_km.or(profile.radius_km);
            spec.province_name = spec.province_name.or(profile.province_name);
            spec.ward_name = spec.ward_name.or(profile.ward_name);
        }
    }

    let posts = match state.posts.all_posts().await {
        Ok(posts) => posts,
        Err(e) => {
            tracing::error!("Failed to load posts: {}", e);
            return HttpResponse::InternalServerError().json(error_body(500, "Failed to load posts", e.to_string()));
        }
    };

    let result = filter_posts_with_stats(&posts, &spec);

    tracing::info!(
        "Returning {} posts (from {} candidates)",
        result.posts.len(),
        result.total_candidates
    );

    HttpResponse::Ok().json(FilterPostsResponse {
        total_results: result.posts.len(),
        total_candidates: result.total_candidates,
        distance_filter_active: result.distance_filter_active,
        posts: result.posts,
    })
}

/// Get a single post
///
/// GET /api/v1/posts/{id}
async fn get_post(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    match state.posts.find_by_id(&id).await {
        Ok(Some(post)) => HttpResponse::Ok().json(post),
        Ok(None) => HttpResponse::NotFound().json(error_body(404, "Post not found", format!("No post with id {}", id))),
        Err(e) => {
            tracing::error!("Failed to load post {}: {}", id, e);
            HttpResponse::InternalServerError().json(error_body(500, "Failed to load post", e.to_string()))
        }
    }
}
