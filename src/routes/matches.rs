use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{ErrorResponse, ListingMatchRequest, MatchesResponse, RoommateMatchRequest};
use super::AppState;

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/matches/roommates", web::post().to(match_roommates))
        .route("/matches/listings", web::post().to(match_listings));
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Rank roommate candidates
///
/// POST /api/v1/matches/roommates
///
/// Request body:
/// ```json
/// {
///   "subject": { "id": "u1", "role": "seeker", "locality": "Cambridge" },
///   "candidates": [ ... ],
///   "threshold": 0.5
/// }
/// ```
async fn match_roommates(
    state: web::Data<AppState>,
    req: web::Json<RoommateMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for roommate request: {:?}", errors);
        return validation_error(errors);
    }

    let threshold = req.threshold.unwrap_or(state.ranking.roommate_threshold);
    let result = state
        .ranker
        .rank_roommates(&req.subject, &req.candidates, threshold);

    tracing::info!(
        "Returning {} roommate matches for {} (from {} candidates)",
        result.matches.len(),
        req.subject.id,
        result.total_candidates
    );

    HttpResponse::Ok().json(MatchesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
        ingestion: None,
    })
}

/// Rank listings for a subject
///
/// POST /api/v1/matches/listings
///
/// Provider listings from an ingestion cycle come first, followed by the
/// user-authored listings in the request body.
async fn match_listings(
    state: web::Data<AppState>,
    req: web::Json<ListingMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for listing request: {:?}", errors);
        return validation_error(errors);
    }

    let req = req.into_inner();
    let threshold = req.threshold.unwrap_or(state.ranking.listing_threshold);

    let (mut listings, ingestion) = if req.include_ingested {
        let report = state.ingestion.run_cycle(req.filter.as_deref()).await;
        (report.listings, Some(report.status))
    } else {
        (Vec::new(), None)
    };
    listings.extend(req.listings);

    let result = state.ranker.rank_listings(&req.subject, &listings, threshold);

    tracing::info!(
        "Returning {} listing matches for {} (from {} listings)",
        result.matches.len(),
        req.subject.id,
        result.total_candidates
    );

    HttpResponse::Ok().json(MatchesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
        ingestion,
    })
}
