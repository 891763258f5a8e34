use crate::core::locality::{LOCALITIES, REGION_CODE};
use crate::core::normalizer::RecordNormalizer;
use crate::models::Listing;
use crate::services::cache::{CacheKey, ListingCache};
use crate::services::provider::{ListingProvider, ProviderError, SearchRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Calls issued for the primary locality per cycle
pub const PRIMARY_CALLS: u32 = 6;

/// Calls issued for each secondary locality per cycle
pub const SECONDARY_CALLS: u32 = 2;

/// Records requested by each call
pub const RECORDS_PER_CALL: u32 = 1;

/// How an ingestion cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Every issued call succeeded
    Succeeded,
    /// At least one call failed; the rest were still used
    PartiallyFailed,
    /// Every call was served from the cache; nothing was issued
    Cached,
    /// No provider credential; nothing was issued
    NotConfigured,
}

/// Outcome of one ingestion cycle
#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub status: CycleStatus,
    pub listings: Vec<Listing>,
    pub calls_issued: usize,
    pub calls_failed: usize,
    pub cache_hits: usize,
}

impl IngestionReport {
    fn not_configured() -> Self {
        Self {
            status: CycleStatus::NotConfigured,
            listings: Vec::new(),
            calls_issued: 0,
            calls_failed: 0,
            cache_hits: 0,
        }
    }
}

/// Number of calls one locality receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalityShare {
    pub locality: String,
    pub calls: u32,
}

/// Fixed partition of upstream calls across localities
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub shares: Vec<LocalityShare>,
}

/// One planned upstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCall {
    pub locality: String,
    pub ordinal: u32,
    pub query: String,
    pub cache_key: String,
}

impl QueryPlan {
    /// Primary locality first with the larger share, then each secondary
    pub fn new(
        primary: impl Into<String>,
        primary_calls: u32,
        secondary: impl IntoIterator<Item = String>,
        secondary_calls: u32,
    ) -> Self {
        let mut shares = vec![LocalityShare {
            locality: primary.into(),
            calls: primary_calls,
        }];
        shares.extend(secondary.into_iter().map(|locality| LocalityShare {
            locality,
            calls: secondary_calls,
        }));

        Self { shares }
    }

    pub fn total_calls(&self) -> usize {
        self.shares.iter().map(|s| s.calls as usize).sum()
    }

    /// Expand the plan into concrete calls for an optional free-text filter
    pub fn calls(&self, filter: Option<&str>) -> Vec<PlannedCall> {
        let filter = filter.map(str::trim).filter(|f| !f.is_empty());

        self.shares
            .iter()
            .flat_map(|share| {
                let query = match filter {
                    Some(f) => format!("{}, {} {}", share.locality, REGION_CODE, f),
                    None => format!("{}, {}", share.locality, REGION_CODE),
                };
                (0..share.calls).map(move |ordinal| PlannedCall {
                    locality: share.locality.clone(),
                    ordinal,
                    cache_key: CacheKey::call(&query, ordinal),
                    query: query.clone(),
                })
            })
            .collect()
    }
}

impl Default for QueryPlan {
    fn default() -> Self {
        let (primary, secondary) = LOCALITIES.split_at(1);
        Self::new(
            primary[0].name,
            PRIMARY_CALLS,
            secondary.iter().map(|l| l.name.to_string()),
            SECONDARY_CALLS,
        )
    }
}

/// Fans out the partitioned upstream queries and merges their listings
///
/// The cache is injected so tests and callers control its lifetime.
pub struct IngestionOrchestrator {
    provider: Arc<dyn ListingProvider>,
    cache: ListingCache,
    normalizer: RecordNormalizer,
    plan: QueryPlan,
    call_timeout: Duration,
}

impl IngestionOrchestrator {
    pub fn new(
        provider: Arc<dyn ListingProvider>,
        cache: ListingCache,
        normalizer: RecordNormalizer,
        plan: QueryPlan,
        call_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            normalizer,
            plan,
            call_timeout,
        }
    }

    pub fn cache(&self) -> &ListingCache {
        &self.cache
    }

    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    /// Forget every cached call so the next cycle re-ingests everything
    pub fn reset_cache(&self) {
        self.cache.clear();
        tracing::info!("Ingestion cache reset");
    }

    /// Run one ingestion cycle
    ///
    /// Calls already cached are reused; every other call is spawned at once
    /// and awaited to completion regardless of sibling failures. Each task
    /// caches its own successful result, so the next cycle retries exactly
    /// the failed ones even if this future is dropped early.
    pub async fn run_cycle(&self, filter: Option<&str>) -> IngestionReport {
        if !self.provider.has_credentials() {
            tracing::error!("Listings provider has no API key; skipping ingestion");
            return IngestionReport::not_configured();
        }

        let calls = self.plan.calls(filter);
        let mut results: Vec<Option<Arc<Vec<Listing>>>> = Vec::with_capacity(calls.len());
        let mut pending = Vec::new();

        for (index, call) in calls.iter().enumerate() {
            let hit = self.cache.get(&call.cache_key).await;
            if hit.is_none() {
                pending.push(index);
            }
            results.push(hit);
        }

        let cache_hits = calls.len() - pending.len();

        if pending.is_empty() {
            tracing::debug!(calls = calls.len(), "Serving ingestion from cache");
            return IngestionReport {
                status: CycleStatus::Cached,
                listings: merge_unique(&results),
                calls_issued: 0,
                calls_failed: 0,
                cache_hits,
            };
        }

        tracing::info!(
            issued = pending.len(),
            cached = cache_hits,
            "Starting ingestion cycle"
        );

        // Spawn every call before awaiting any of them
        let tasks: Vec<_> = pending
            .iter()
            .map(|&index| {
                let call = &calls[index];
                let request = SearchRequest {
                    query: call.query.clone(),
                    limit: RECORDS_PER_CALL,
                    offset: call.ordinal,
                };
                let provider = Arc::clone(&self.provider);
                let normalizer = self.normalizer.clone();
                let cache = self.cache.clone();
                let cache_key = call.cache_key.clone();
                let timeout = self.call_timeout;

                let task = tokio::spawn(async move {
                    let listings =
                        Arc::new(fetch_call(provider.as_ref(), &normalizer, &request, timeout).await?);
                    cache.insert(cache_key, Arc::clone(&listings)).await;
                    Ok::<_, ProviderError>(listings)
                });
                (index, task)
            })
            .collect();

        let mut calls_failed = 0;

        for (index, task) in tasks {
            let call = &calls[index];
            match task.await {
                Ok(Ok(listings)) => {
                    results[index] = Some(listings);
                }
                Ok(Err(e)) => {
                    calls_failed += 1;
                    tracing::warn!(
                        query = %call.query,
                        ordinal = call.ordinal,
                        error = %e,
                        "Upstream call failed"
                    );
                }
                Err(e) => {
                    calls_failed += 1;
                    tracing::error!(query = %call.query, error = %e, "Ingestion task join error");
                }
            }
        }

        let listings = merge_unique(&results);
        let status = if calls_failed == 0 {
            CycleStatus::Succeeded
        } else {
            tracing::warn!(
                success_count = pending.len() - calls_failed,
                error_count = calls_failed,
                "Partial ingestion failure"
            );
            CycleStatus::PartiallyFailed
        };

        tracing::info!(listings = listings.len(), ?status, "Ingestion cycle finished");

        IngestionReport {
            status,
            listings,
            calls_issued: pending.len(),
            calls_failed,
            cache_hits,
        }
    }
}

async fn fetch_call(
    provider: &dyn ListingProvider,
    normalizer: &RecordNormalizer,
    request: &SearchRequest,
    timeout: Duration,
) -> Result<Vec<Listing>, ProviderError> {
    let page = tokio::time::timeout(timeout, provider.search(request))
        .await
        .map_err(|_| ProviderError::Timeout(timeout))??;

    Ok(page
        .records
        .iter()
        .filter_map(|record| normalizer.normalize(record))
        .collect())
}

/// Union per-call results in plan order, keeping the first listing per id
fn merge_unique(results: &[Option<Arc<Vec<Listing>>>]) -> Vec<Listing> {
    let mut seen = HashSet::new();

    results
        .iter()
        .flatten()
        .flat_map(|listings| listings.iter())
        .filter(|listing| seen.insert(listing.id.clone()))
        .cloned()
        .collect()
}
