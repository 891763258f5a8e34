use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use nest_match::config::Settings;
use nest_match::core::{RecordNormalizer, Ranker};
use nest_match::routes::{self, AppState};
use nest_match::services::{IngestionOrchestrator, ListingCache, ListingProvider, RentalDataClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, format!("Configuration error: {}", e)))?;

    // LOG_LEVEL / LOG_FORMAT win over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());
    init_tracing(&log_level, &log_format);

    info!("Starting nest-match service...");
    info!("Configuration loaded successfully");

    let client = RentalDataClient::new(
        settings.provider.base_url.clone(),
        settings.provider.api_key.clone(),
        Duration::from_secs(settings.provider.timeout_secs),
    )
    .map_err(|e| {
        error!("Failed to build listings provider client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    if client.has_credentials() {
        info!("Listings provider configured at {}", client.base_url());
    } else {
        warn!("RENTAL_API_KEY not set; ingestion cycles will be skipped");
    }

    let provider: Arc<dyn ListingProvider> = Arc::new(client);
    let plan = settings.ingestion.plan();

    info!(
        "Ingestion plan: {} localities, {} calls per cycle",
        plan.shares.len(),
        plan.total_calls()
    );

    let ingestion = Arc::new(IngestionOrchestrator::new(
        provider,
        ListingCache::new(),
        RecordNormalizer::new((&settings.normalizer).into()),
        plan,
        settings.ingestion.call_timeout(),
    ));

    let ranker = Ranker::new((&settings.scoring.weights).into());

    info!("Ranker initialized with weights: {:?}", ranker.weights());

    let app_state = AppState {
        ingestion,
        ranker,
        ranking: settings.ranking,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
