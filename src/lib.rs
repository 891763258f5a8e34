//! Nest Match - roommate and rental listing recommendations
//!
//! This library ingests rental listings from an upstream provider, normalizes
//! them into a canonical shape, and ranks roommates and listings for a user
//! with a weighted compatibility score.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Ranker, RecordNormalizer, score_profiles, score_listing, distance::{haversine_distance, haversine_miles}};
pub use models::{Listing, Profile, MatchResult, ScoringWeights, RoommateMatchRequest, ListingMatchRequest, MatchesResponse};
pub use services::{IngestionOrchestrator, ListingCache, ListingProvider, RentalDataClient};
