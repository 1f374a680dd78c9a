//! Feature extraction from a card's transaction history.
//!
//! Produces the four features the credit model was trained on, in the
//! order given by [`FEATURE_NAMES`](crate::models::FEATURE_NAMES).

use crate::models::{CardFeatures, TransactionRecord};
use std::collections::HashSet;

/// Extract the feature tuple for one card.
///
/// Returns `None` for an empty history: a card without transactions has no
/// features and must be skipped by the caller rather than scored as zeros.
/// The input does not need to be sorted.
pub fn extract(transactions: &[TransactionRecord]) -> Option<CardFeatures> {
    if transactions.is_empty() {
        return None;
    }

    let total_amount: f64 = transactions.iter().filter_map(|tx| tx.amount).sum();

    let distinct_acquirer_count = transactions
        .iter()
        .filter_map(|tx| tx.acquirer_id.as_deref())
        .collect::<HashSet<_>>()
        .len() as u64;

    Some(CardFeatures {
        transaction_count: transactions.len() as u64,
        total_amount,
        distinct_acquirer_count,
        avg_days_between_tx: average_days_between(transactions),
    })
}

/// Mean day gap between consecutive transactions after sorting by date.
fn average_days_between(transactions: &[TransactionRecord]) -> f64 {
    if transactions.len() < 2 {
        return 0.0;
    }

    let mut dates: Vec<_> = transactions.iter().map(|tx| tx.date).collect();
    dates.sort_unstable();

    let total_days: i64 = dates
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .sum();

    total_days as f64 / (dates.len() - 1) as f64
}
