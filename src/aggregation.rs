//! Combines per-card results into one identity-level score.

use crate::models::{CardFeatures, CombinedFeatures, RiskTier};
use serde::Serialize;
use std::collections::BTreeSet;

/// A card that made it through fetch and extraction.
///
/// `score` is `None` when no model is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCard {
    pub features: CardFeatures,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateResult {
    pub features: CombinedFeatures,
    /// Mean of the per-card scores, truncated toward zero.
    pub score: i64,
    pub risk_level: RiskTier,
}

impl AggregateResult {
    fn empty() -> Self {
        Self {
            features: CombinedFeatures::default(),
            score: 0,
            risk_level: RiskTier::Unknown,
        }
    }
}

/// Aggregate the included cards of one identity.
///
/// Features are combined over every card given; the score and tier only over
/// cards that carry a score. With no scored card the result is score 0 and
/// tier `UNKNOWN`.
pub fn aggregate(cards: &[ScoredCard]) -> AggregateResult {
    if cards.is_empty() {
        return AggregateResult::empty();
    }

    let transaction_count: u64 = cards.iter().map(|c| c.features.transaction_count).sum();
    let total_amount: f64 = cards.iter().map(|c| c.features.total_amount).sum();

    // NOTE: counts distinct *values* of the per-card acquirer counts, not
    // distinct acquirers across cards.
    let distinct_acquirer_count = cards
        .iter()
        .map(|c| c.features.distinct_acquirer_count)
        .collect::<BTreeSet<_>>()
        .len() as u64;

    let avg_days_between_tx = cards
        .iter()
        .map(|c| c.features.avg_days_between_tx)
        .sum::<f64>()
        / cards.len() as f64;

    let features = CombinedFeatures {
        transaction_count,
        total_amount,
        distinct_acquirer_count,
        avg_days_between_tx,
    };

    let scores: Vec<f64> = cards.iter().filter_map(|c| c.score).collect();
    if scores.is_empty() {
        return AggregateResult {
            features,
            score: 0,
            risk_level: RiskTier::Unknown,
        };
    }

    let score = (scores.iter().sum::<f64>() / scores.len() as f64).trunc() as i64;

    AggregateResult {
        features,
        score,
        risk_level: RiskTier::from_score(score as f64),
    }
}
