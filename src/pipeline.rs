//! Per-identity credit scoring pipeline.
//!
//! For every card: fetch transactions, extract features, score. Each card
//! yields its own `Result`, so a failing card is reported and excluded
//! without affecting the others. Only the successful cards are aggregated.

use crate::aggregation::{aggregate, AggregateResult, ScoredCard};
use crate::features;
use crate::models::mask_card_number;
use crate::scoring::{ScoreError, Scorer};
use crate::transaction_store::{StoreError, TransactionStore};
use std::sync::Arc;

/// Why a card was left out of the aggregate.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("No transactions found")]
    NotFound,
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("scoring error: {0}")]
    Scoring(ScoreError),
}

/// Outcome for one card of the request.
#[derive(Debug)]
pub struct CardReport {
    pub card_number: String,
    pub outcome: Result<ScoredCard, CardError>,
}

/// Everything produced for one identity.
#[derive(Debug)]
pub struct PipelineReport {
    pub cards: Vec<CardReport>,
    pub aggregate: AggregateResult,
    /// False when scoring ran without a model.
    pub model_available: bool,
}

/// Scores all cards of an identity against an injected store and model.
#[derive(Clone)]
pub struct CreditScorePipeline {
    store: Arc<dyn TransactionStore>,
    scorer: Scorer,
}

impl CreditScorePipeline {
    pub fn new(store: Arc<dyn TransactionStore>, scorer: Scorer) -> Self {
        Self { store, scorer }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn store(&self) -> &Arc<dyn TransactionStore> {
        &self.store
    }

    /// Process one card: fetch, extract, score.
    ///
    /// A missing model is not a card failure; the card is kept without a score.
    pub async fn process_card(&self, card_number: &str) -> Result<ScoredCard, CardError> {
        let transactions = self.store.fetch(card_number).await?;

        let features = features::extract(&transactions).ok_or(CardError::NotFound)?;

        let score = match self.scorer.score(&features) {
            Ok(score) => Some(score),
            Err(ScoreError::ModelUnavailable) => None,
            Err(e) => return Err(CardError::Scoring(e)),
        };

        Ok(ScoredCard { features, score })
    }

    /// Score every card sequentially and aggregate the successful ones.
    pub async fn run<I, S>(&self, card_numbers: I) -> PipelineReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cards = Vec::new();

        for card_number in card_numbers {
            let card_number = card_number.into();
            let outcome = self.process_card(&card_number).await;
            log_outcome(&card_number, &outcome);
            cards.push(CardReport {
                card_number,
                outcome,
            });
        }

        let included: Vec<ScoredCard> = cards
            .iter()
            .filter_map(|report| report.outcome.as_ref().ok().copied())
            .collect();

        let aggregate = aggregate(&included);

        tracing::info!(
            "Scored {} of {} card(s): score={}, risk_level={}",
            included.len(),
            cards.len(),
            aggregate.score,
            aggregate.risk_level
        );

        PipelineReport {
            cards,
            aggregate,
            model_available: self.scorer.is_available(),
        }
    }
}

fn log_outcome(card_number: &str, outcome: &Result<ScoredCard, CardError>) {
    let masked = mask_card_number(card_number);
    match outcome {
        Ok(ScoredCard {
            score: Some(score), ..
        }) => tracing::debug!("Card {} scored {:.2}", masked, score),
        Ok(ScoredCard { score: None, .. }) => {
            tracing::warn!("Card {} not scored: model unavailable", masked)
        }
        Err(CardError::NotFound) => tracing::info!("Card {} has no transactions", masked),
        Err(e) => tracing::error!("Card {} failed: {}", masked, e),
    }
}
