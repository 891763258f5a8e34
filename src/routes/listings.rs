use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{CacheResetResponse, ErrorResponse, HealthResponse, RefreshListingsRequest, RefreshListingsResponse};
use super::AppState;

/// Configure health and ingestion routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/listings/refresh", web::post().to(refresh_listings))
        .route("/listings/cache/reset", web::post().to(reset_cache));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        cached_entries: state.ingestion.cache().entry_count(),
    })
}

/// Run an ingestion cycle
///
/// POST /api/v1/listings/refresh
///
/// Request body:
/// ```json
/// { "filter": "pets allowed" }
/// ```
async fn refresh_listings(
    state: web::Data<AppState>,
    req: web::Json<RefreshListingsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let report = state.ingestion.run_cycle(req.filter.as_deref()).await;

    tracing::info!(
        "Refresh returned {} listings ({:?}, {} issued, {} failed)",
        report.listings.len(),
        report.status,
        report.calls_issued,
        report.calls_failed
    );

    HttpResponse::Ok().json(RefreshListingsResponse {
        status: report.status,
        listings: report.listings,
        calls_issued: report.calls_issued,
        calls_failed: report.calls_failed,
        cache_hits: report.cache_hits,
    })
}

/// Clear the ingestion cache so the next cycle re-fetches everything
///
/// POST /api/v1/listings/cache/reset
async fn reset_cache(state: web::Data<AppState>) -> impl Responder {
    state.ingestion.reset_cache();

    HttpResponse::Ok().json(CacheResetResponse { success: true })
}
