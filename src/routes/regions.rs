use actix_web::{web, HttpResponse, Responder};
use crate::models::RegionListResponse;
use crate::routes::AppState;

/// Configure region lookup routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/regions/provinces", web::get().to(list_provinces))
        .route("/regions/provinces/{code}/wards", web::get().to(list_wards));
}

/// List provinces
///
/// GET /api/v1/regions/provinces
///
/// An unreachable lookup service yields an empty list, not an error.
async fn list_provinces(state: web::Data<AppState>) -> impl Responder {
    let regions = state.catalog.fetch_provinces().await;
    tracing::debug!("Returning {} provinces", regions.len());

    HttpResponse::Ok().json(RegionListResponse {
        count: regions.len(),
        regions,
    })
}

/// List the wards of one province
///
/// GET /api/v1/regions/provinces/{code}/wards
async fn list_wards(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let province_code = path.into_inner();
    let regions = state.catalog.fetch_wards(&province_code).await;
    tracing::debug!("Returning {} wards for province {}", regions.len(), province_code);

    HttpResponse::Ok().json(RegionListResponse {
        count: regions.len(),
        regions,
    })
}
