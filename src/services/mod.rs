// Service exports
pub mod cache;
pub mod ingestion;
pub mod provider;

pub use cache::{CacheKey, ListingCache};
pub use ingestion::{CycleStatus, IngestionOrchestrator, IngestionReport, PlannedCall, QueryPlan};
pub use provider::{ListingProvider, ProviderError, RentalDataClient, SearchPage, SearchRequest};
