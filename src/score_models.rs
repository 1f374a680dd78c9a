use crate::models::{CardFeatures, CombinedFeatures, RiskTier};
use crate::pipeline::{CardError, CardReport, PipelineReport};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of a credit score request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreditScoreRequest {
    /// National identifier grouping the cards.
    #[serde(default, alias = "fayda_number")]
    pub identity_id: Option<String>,

    /// Cards to score; `null` is treated as empty.
    #[serde(default)]
    pub data: Option<Vec<CardEntry>>,

    /// Echoed back unmodified.
    #[serde(default, rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CardEntry {
    pub card_number: Option<String>,
    pub bic: Option<String>,
    pub account_number: Option<String>,
}

impl CardEntry {
    /// The card number, if present and not blank.
    pub fn card_number(&self) -> Option<&str> {
        self.card_number
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

impl CreditScoreRequest {
    /// The identity, if present and not blank.
    pub fn identity(&self) -> Option<&str> {
        self.identity_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Entries with a usable card number, in request order.
    pub fn card_entries(&self) -> impl Iterator<Item = &CardEntry> {
        self.data
            .iter()
            .flatten()
            .filter(|entry| entry.card_number().is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    Scored,
    /// Features computed but no model loaded.
    Unscored,
    NoTransactions,
    Error,
}

/// Per-card section of the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardResult {
    pub card_number: String,
    pub bic: Option<String>,
    pub account_number: Option<String>,
    pub status: CardStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<CardFeatures>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CardResult {
    /// Build the public view of a card report; storage details are not exposed.
    pub fn from_report(entry: &CardEntry, report: &CardReport) -> Self {
        let mut result = Self {
            card_number: report.card_number.clone(),
            bic: entry.bic.clone(),
            account_number: entry.account_number.clone(),
            status: CardStatus::Error,
            credit_score: None,
            risk_level: None,
            features: None,
            error: None,
        };

        match &report.outcome {
            Ok(card) => {
                result.features = Some(card.features);
                match card.score {
                    Some(score) => {
                        result.status = CardStatus::Scored;
                        result.credit_score = Some(score);
                        result.risk_level = Some(RiskTier::from_score(score));
                    }
                    None => {
                        result.status = CardStatus::Unscored;
                        result.risk_level = Some(RiskTier::Unknown);
                    }
                }
            }
            Err(CardError::NotFound) => {
                result.status = CardStatus::NoTransactions;
                result.error = Some(CardError::NotFound.to_string());
            }
            Err(CardError::Storage(_)) => {
                result.error = Some("Failed to retrieve transactions".to_string());
            }
            Err(CardError::Scoring(_)) => {
                result.error = Some("Failed to score card".to_string());
            }
        }

        result
    }
}

/// Combined credit score for an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditScoreResponse {
    pub request_id: Uuid,
    pub identity_id: String,
    #[serde(rename = "type")]
    pub response_type: String,
    pub score: i64,
    pub risk_level: RiskTier,
    pub features: CombinedFeatures,
    pub model_available: bool,
    pub results: Vec<CardResult>,
    #[serde(rename = "callbackUrl")]
    pub callback_url: String,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
}

pub const CREDIT_SCORE_TYPE: &str = "CREDIT_SCORE";

impl CreditScoreResponse {
    /// `entries` must be the same entries, in the same order, the pipeline ran on.
    pub fn build(
        identity_id: &str,
        entries: &[&CardEntry],
        report: &PipelineReport,
        callback_url: Option<&str>,
    ) -> Self {
        let results = entries
            .iter()
            .zip(report.cards.iter())
            .map(|(entry, card)| CardResult::from_report(entry, card))
            .collect();

        Self {
            request_id: Uuid::new_v4(),
            identity_id: identity_id.to_string(),
            response_type: CREDIT_SCORE_TYPE.to_string(),
            score: report.aggregate.score,
            risk_level: report.aggregate.risk_level,
            features: report.aggregate.features,
            model_available: report.model_available,
            results,
            callback_url: callback_url.unwrap_or_default().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
