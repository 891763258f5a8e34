// Ingestion tests for nest-match

use async_trait::async_trait;
use mockito::{Matcher, Server};
use nest_match::core::RecordNormalizer;
use nest_match::models::RawProviderRecord;
use nest_match::services::{
    CycleStatus, IngestionOrchestrator, ListingCache, ListingProvider, ProviderError, QueryPlan,
    RentalDataClient, SearchPage, SearchRequest,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Scripted provider: one record per call, id derived from query and offset
#[derive(Default)]
struct FakeProvider {
    calls: AtomicUsize,
    failing: Mutex<HashSet<(String, u32)>>,
    stalled: Mutex<HashSet<(String, u32)>>,
    duplicate_ids: bool,
    delay: Duration,
    no_key: bool,
}

impl FakeProvider {
    fn fail(&self, query: &str, offset: u32) {
        self.failing.lock().unwrap().insert((query.to_string(), offset));
    }

    fn stall(&self, query: &str, offset: u32) {
        self.stalled.lock().unwrap().insert((query.to_string(), offset));
    }

    fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn listing_record(id: &str, city: &str) -> RawProviderRecord {
    serde_json::from_value(json!({
        "id": id,
        "address": "5 Pine St",
        "city": city,
        "state": "MA",
        "lat": "42.37",
        "lon": "-71.08",
        "prices": [{ "type": "rent", "amount": 2100 }]
    }))
    .unwrap()
}

#[async_trait]
impl ListingProvider for FakeProvider {
    fn has_credentials(&self) -> bool {
        !self.no_key
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let key = (request.query.clone(), request.offset);
        let stalled = self.stalled.lock().unwrap().contains(&key);
        if stalled {
            tokio::time::sleep(Duration::from_secs(5)).await;
        } else if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.lock().unwrap().contains(&key) {
            return Err(ProviderError::ApiError("scripted failure".to_string()));
        }

        let city = request.query.split(',').next().unwrap_or_default();
        let id = if self.duplicate_ids {
            "shared".to_string()
        } else {
            format!("{}-{}", city, request.offset)
        };

        Ok(SearchPage {
            records: vec![listing_record(&id, city)],
            total: Some(100),
        })
    }
}

fn small_plan() -> QueryPlan {
    QueryPlan::new("Boston", 2, vec!["Cambridge".to_string()], 1)
}

fn orchestrator(provider: Arc<FakeProvider>, timeout: Duration) -> IngestionOrchestrator {
    IngestionOrchestrator::new(
        provider,
        ListingCache::new(),
        RecordNormalizer::default(),
        small_plan(),
        timeout,
    )
}

#[tokio::test]
async fn test_cycle_issues_every_planned_call() {
    let provider = Arc::new(FakeProvider::default());
    let ingestion = orchestrator(provider.clone(), Duration::from_secs(5));

    let report = ingestion.run_cycle(None).await;

    assert_eq!(report.status, CycleStatus::Succeeded);
    assert_eq!(report.calls_issued, ingestion.plan().total_calls());
    assert_eq!(report.calls_failed, 0);
    assert_eq!(provider.call_count(), 3);

    let ids: Vec<&str> = report.listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["Boston-0", "Boston-1", "Cambridge-0"]);
}

#[tokio::test]
async fn test_duplicate_ids_are_merged() {
    let provider = Arc::new(FakeProvider {
        duplicate_ids: true,
        ..Default::default()
    });
    let ingestion = orchestrator(provider, Duration::from_secs(5));

    let report = ingestion.run_cycle(None).await;

    assert_eq!(report.listings.len(), 1);
    // First call in plan order wins
    assert_eq!(report.listings[0].city, "Boston");
}

#[tokio::test]
async fn test_partial_failure_keeps_successful_calls() {
    let provider = Arc::new(FakeProvider::default());
    provider.fail("Boston, MA", 1);
    let ingestion = orchestrator(provider.clone(), Duration::from_secs(5));

    let report = ingestion.run_cycle(None).await;

    assert_eq!(report.status, CycleStatus::PartiallyFailed);
    assert_eq!(report.calls_issued, 3);
    assert_eq!(report.calls_failed, 1);
    assert_eq!(report.listings.len(), 2);
}

#[tokio::test]
async fn test_next_cycle_retries_only_failed_calls() {
    let provider = Arc::new(FakeProvider::default());
    provider.fail("Cambridge, MA", 0);
    let ingestion = orchestrator(provider.clone(), Duration::from_secs(5));

    let first = ingestion.run_cycle(None).await;
    assert_eq!(first.status, CycleStatus::PartiallyFailed);
    assert_eq!(provider.call_count(), 3);

    provider.heal();
    let second = ingestion.run_cycle(None).await;

    assert_eq!(second.status, CycleStatus::Succeeded);
    assert_eq!(second.calls_issued, 1);
    assert_eq!(second.cache_hits, 2);
    assert_eq!(second.listings.len(), 3);
    assert_eq!(provider.call_count(), 4);
}

#[tokio::test]
async fn test_fully_cached_cycle_issues_nothing() {
    let provider = Arc::new(FakeProvider::default());
    let ingestion = orchestrator(provider.clone(), Duration::from_secs(5));

    ingestion.run_cycle(None).await;
    let cached = ingestion.run_cycle(None).await;

    assert_eq!(cached.status, CycleStatus::Cached);
    assert_eq!(cached.calls_issued, 0);
    assert_eq!(cached.cache_hits, 3);
    assert_eq!(cached.listings.len(), 3);
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_filter_changes_cache_keys() {
    let provider = Arc::new(FakeProvider::default());
    let ingestion = orchestrator(provider.clone(), Duration::from_secs(5));

    ingestion.run_cycle(None).await;
    let filtered = ingestion.run_cycle(Some("pets allowed")).await;

    assert_eq!(filtered.status, CycleStatus::Succeeded);
    assert_eq!(filtered.calls_issued, 3);
    assert_eq!(provider.call_count(), 6);
}

#[tokio::test]
async fn test_missing_credentials_skips_cycle() {
    let provider = Arc::new(FakeProvider {
        no_key: true,
        ..Default::default()
    });
    let ingestion = orchestrator(provider.clone(), Duration::from_secs(5));

    let report = ingestion.run_cycle(None).await;

    assert_eq!(report.status, CycleStatus::NotConfigured);
    assert!(report.listings.is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_reset_forces_full_reingestion() {
    let provider = Arc::new(FakeProvider::default());
    let ingestion = orchestrator(provider.clone(), Duration::from_secs(5));

    ingestion.run_cycle(None).await;
    ingestion.reset_cache();
    let report = ingestion.run_cycle(None).await;

    assert_eq!(report.status, CycleStatus::Succeeded);
    assert_eq!(report.calls_issued, 3);
    assert_eq!(provider.call_count(), 6);
}

#[tokio::test]
async fn test_slow_calls_time_out_without_caching() {
    let provider = Arc::new(FakeProvider::default());
    for (query, offset) in [("Boston, MA", 0), ("Boston, MA", 1), ("Cambridge, MA", 0)] {
        provider.stall(query, offset);
    }
    let ingestion = orchestrator(provider.clone(), Duration::from_millis(50));

    let report = ingestion.run_cycle(None).await;

    assert_eq!(report.status, CycleStatus::PartiallyFailed);
    assert_eq!(report.calls_failed, 3);
    assert!(report.listings.is_empty());

    ingestion.cache().sync().await;
    assert_eq!(ingestion.cache().entry_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_calls_run_concurrently() {
    let provider = Arc::new(FakeProvider {
        delay: Duration::from_millis(200),
        ..Default::default()
    });
    let ingestion = IngestionOrchestrator::new(
        provider.clone(),
        ListingCache::new(),
        RecordNormalizer::default(),
        QueryPlan::default(),
        Duration::from_secs(5),
    );
    let calls = ingestion.plan().total_calls();

    let started = Instant::now();
    let report = ingestion.run_cycle(None).await;
    let elapsed = started.elapsed();

    assert_eq!(report.status, CycleStatus::Succeeded);
    assert_eq!(provider.call_count(), calls);
    assert_eq!(report.listings.len(), calls);
    // Sequential calls would take calls * 200ms
    assert!(elapsed < Duration::from_millis(200 * calls as u64 / 2), "took {:?}", elapsed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stalled_call_does_not_block_siblings() {
    let provider = Arc::new(FakeProvider {
        delay: Duration::from_millis(200),
        ..Default::default()
    });
    provider.stall("Boston, MA", 3);
    let ingestion = IngestionOrchestrator::new(
        provider.clone(),
        ListingCache::new(),
        RecordNormalizer::default(),
        QueryPlan::default(),
        Duration::from_secs(1),
    );
    let calls = ingestion.plan().total_calls();

    let started = Instant::now();
    let report = ingestion.run_cycle(None).await;
    let elapsed = started.elapsed();

    assert_eq!(report.status, CycleStatus::PartiallyFailed);
    assert_eq!(report.calls_failed, 1);
    assert_eq!(report.listings.len(), calls - 1);
    // The cycle waits for the stalled call to time out
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_millis(200 * calls as u64));

    ingestion.cache().sync().await;
    assert_eq!(ingestion.cache().entry_count(), (calls - 1) as u64);
}

#[tokio::test]
async fn test_dropped_cycle_still_caches_results() {
    let provider = Arc::new(FakeProvider {
        delay: Duration::from_millis(100),
        ..Default::default()
    });
    let ingestion = orchestrator(provider.clone(), Duration::from_secs(5));

    let dropped = tokio::time::timeout(Duration::from_millis(20), ingestion.run_cycle(None)).await;
    assert!(dropped.is_err());

    tokio::time::sleep(Duration::from_millis(400)).await;
    ingestion.cache().sync().await;
    assert_eq!(ingestion.cache().entry_count(), 3);

    let report = ingestion.run_cycle(None).await;
    assert_eq!(report.status, CycleStatus::Cached);
    assert_eq!(provider.call_count(), 3);
}

#[tokio::test]
async fn test_rental_client_search() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", Matcher::Regex(r"^/listings/search".to_string()))
        .match_header("x-api-key", "secret")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("query".into(), "Medford, MA".into()),
            Matcher::UrlEncoded("limit".into(), "1".into()),
            Matcher::UrlEncoded("offset".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "total": 40,
                "records": [{
                    "property_id": 9917,
                    "address": "3 Salem St",
                    "city": "Medford",
                    "state_code": "MA",
                    "latitude": 42.42,
                    "longitude": -71.10,
                    "prices": [{ "type": "rent", "amount": "$1,950" }]
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = RentalDataClient::new(server.url(), Some("secret".to_string()), Duration::from_secs(5)).unwrap();
    let page = client
        .search(&SearchRequest {
            query: "Medford, MA".to_string(),
            limit: 1,
            offset: 1,
        })
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.total, Some(40));
    assert_eq!(page.records.len(), 1);

    let listing = RecordNormalizer::default().normalize(&page.records[0]).unwrap();
    assert_eq!(listing.id, "9917");
    assert_eq!(listing.price, 1950);
}

#[tokio::test]
async fn test_rental_client_unauthorized() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", Matcher::Regex(r"^/listings/search".to_string()))
        .with_status(401)
        .create_async()
        .await;

    let client = RentalDataClient::new(server.url(), Some("wrong".to_string()), Duration::from_secs(5)).unwrap();
    let result = client
        .search(&SearchRequest {
            query: "Boston, MA".to_string(),
            limit: 1,
            offset: 0,
        })
        .await;

    assert!(matches!(result, Err(ProviderError::Unauthorized)));
}

#[tokio::test]
async fn test_rental_client_error_body_is_bounded() {
    let mut server = Server::new_async().await;

    let _mock = server
        .mock("GET", Matcher::Regex(r"^/listings/search".to_string()))
        .with_status(502)
        .with_body("e".repeat(10_000))
        .create_async()
        .await;

    let client = RentalDataClient::new(server.url(), Some("secret".to_string()), Duration::from_secs(5)).unwrap();
    let result = client
        .search(&SearchRequest {
            query: "Boston, MA".to_string(),
            limit: 1,
            offset: 0,
        })
        .await;

    match result {
        Err(ProviderError::ApiError(message)) => assert!(message.len() < 300),
        other => panic!("expected ApiError, got {:?}", other.map(|p| p.records.len())),
    }
}

#[tokio::test]
async fn test_rental_client_without_key_never_calls_out() {
    let mut server = Server::new_async().await;

    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = RentalDataClient::new(server.url(), None, Duration::from_secs(5)).unwrap();
    let ingestion = IngestionOrchestrator::new(
        Arc::new(client),
        ListingCache::new(),
        RecordNormalizer::default(),
        QueryPlan::default(),
        Duration::from_secs(5),
    );

    let report = ingestion.run_cycle(None).await;

    mock.assert_async().await;
    assert_eq!(report.status, CycleStatus::NotConfigured);
}
