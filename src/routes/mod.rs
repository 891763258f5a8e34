// Route exports
pub mod listings;
pub mod matches;

use crate::config::RankingSettings;
use crate::core::Ranker;
use crate::services::IngestionOrchestrator;
use actix_web::web;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub ingestion: Arc<IngestionOrchestrator>,
    pub ranker: Ranker,
    pub ranking: RankingSettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(listings::configure)
            .configure(matches::configure),
    );
}
