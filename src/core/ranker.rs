use crate::models::{Listing, MatchResult, Profile, ScoringWeights};
use crate::core::{
    filters::{apply_locality_adjustment, classify_listing_locality, is_roommate_candidate, LocalityTier},
    scoring::{score_listing, score_profiles, Compatibility},
};
use std::cmp::Ordering;

/// Result of one ranking call
#[derive(Debug)]
pub struct RankedMatches {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
}

/// Recommendation ranker
///
/// # Pipeline Stages
/// 1. Hard filters (self, not seeking, locality)
/// 2. Scoring
/// 3. Threshold (inclusive)
/// 4. Stable descending sort; ties keep input order
#[derive(Debug, Clone)]
pub struct Ranker {
    weights: ScoringWeights,
}

impl Ranker {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn with_default_weights() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Rank candidate roommates for a subject
    ///
    /// Candidates rejected by the locality hard filter are dropped, as are
    /// candidates scoring strictly below `threshold`.
    pub fn rank_roommates(
        &self,
        subject: &Profile,
        candidates: &[Profile],
        threshold: f64,
    ) -> RankedMatches {
        let total_candidates = candidates.len();

        let mut matches: Vec<MatchResult> = candidates
            .iter()
            // Stage 1: self and non-seekers
            .filter(|candidate| is_roommate_candidate(subject, candidate))
            // Stage 2 & 3: score, locality filter, threshold
            .filter_map(|candidate| match score_profiles(subject, candidate, &self.weights) {
                Compatibility::Scored(score) if score.total >= threshold => Some(MatchResult {
                    candidate_id: candidate.id.clone(),
                    score: score.total,
                    reasons: score.reasons,
                }),
                Compatibility::Scored(_) => None,
                Compatibility::Incompatible(reason) => {
                    tracing::trace!(candidate = %candidate.id, ?reason, "Candidate filtered");
                    None
                }
            })
            .collect();

        sort_by_score(&mut matches);

        RankedMatches {
            matches,
            total_candidates,
        }
    }

    /// Rank listings for a subject
    ///
    /// Listings outside the locality allow-list are excluded; the rest get
    /// the same-locality bonus or the floored cross-locality penalty before
    /// the threshold is applied.
    pub fn rank_listings(
        &self,
        subject: &Profile,
        listings: &[Listing],
        threshold: f64,
    ) -> RankedMatches {
        let total_candidates = listings.len();

        let mut matches: Vec<MatchResult> = listings
            .iter()
            .filter_map(|listing| {
                let tier = classify_listing_locality(subject, listing);
                let base = score_listing(subject, listing, &self.weights);
                let score = apply_locality_adjustment(base.total, tier)?;

                if score < threshold {
                    return None;
                }

                let mut reasons = Vec::with_capacity(base.reasons.len() + 1);
                match tier {
                    LocalityTier::Same => reasons.push(format!("In {}", listing.city)),
                    LocalityTier::Nearby => reasons.push(format!("Nearby in {}", listing.city)),
                    LocalityTier::Unspecified | LocalityTier::Excluded => {}
                }
                reasons.extend(base.reasons);

                Some(MatchResult {
                    candidate_id: listing.id.clone(),
                    score,
                    reasons,
                })
            })
            .collect();

        sort_by_score(&mut matches);

        RankedMatches {
            matches,
            total_candidates,
        }
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_weights()
    }
}

// `sort_by` is stable, so equal scores stay in input order.
fn sort_by_score(matches: &mut [MatchResult]) {
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}
