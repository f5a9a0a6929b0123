use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::UpdatePreferencesRequest;
use crate::routes::{error_body, AppState};
use crate::services::PreferenceSynchronizer;

/// Configure preference routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/preferences/{key}", web::get().to(get_preferences))
        .route("/preferences/{key}", web::put().to(update_preferences));
}

/// Get saved preferences
///
/// GET /api/v1/preferences/{key}
async fn get_preferences(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let key = path.into_inner();

    match state.profiles.load(&key).await {
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => HttpResponse::NotFound().json(error_body(404, "Profile not found", format!("No saved preferences for {}", key))),
        Err(e) => {
            tracing::error!("Failed to load preferences for {}: {}", key, e);
            HttpResponse::InternalServerError().json(error_body(500, "Failed to load preferences", e.to_string()))
        }
    }
}

/// Update saved preferences
///
/// PUT /api/v1/preferences/{key}
///
/// Fields left out keep their saved value; an empty string clears one.
async fn update_preferences(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdatePreferencesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_body(400, "Validation failed", errors.to_string()));
    }

    let key = path.into_inner();
    let synchronizer = PreferenceSynchronizer::new(state.profiles.clone(), key.as_str(), state.default_radius_km);

    match synchronizer.try_save(req.into_inner().into()).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => {
            tracing::error!("Failed to save preferences for {}: {}", key, e);
            HttpResponse::InternalServerError().json(error_body(500, "Failed to save preferences", e.to_string()))
        }
    }
}
