// Route exports
pub mod posts;
pub mod preferences;
pub mod regions;

use actix_web::{web, HttpResponse, Responder};
use crate::models::{ErrorResponse, HealthResponse};
use crate::services::{PostRepository, ProfileStore, RegionCatalog};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn RegionCatalog>,
    pub posts: Arc<dyn PostRepository>,
    pub profiles: Arc<dyn ProfileStore>,
    pub default_radius_km: f64,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(regions::configure)
            .configure(posts::configure)
            .configure(preferences::configure),
    );
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

pub(crate) fn error_body(status_code: u16, error: &str, message: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new().route("/health", web::get().to(health_check)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.status, "healthy");
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }
}
