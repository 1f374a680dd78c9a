use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============ Store Models ============

/// A single card transaction as read from the transaction store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Transaction type code (opaque, e.g. "774").
    pub trans_type: Option<String>,
    /// Transaction amount; `None` counts as zero.
    pub amount: Option<f64>,
    /// Acquiring institution identifier; `None` is not counted as an acquirer.
    pub acquirer_id: Option<String>,
    /// Calendar date of the transaction (no time component).
    pub date: NaiveDate,
}

// ============ Feature Models ============

/// Feature names in the exact order the scoring model expects them.
pub const FEATURE_NAMES: [&str; 4] = ["total_tx", "total_amt", "unq_acquinstid", "avg_days_bn_tx"];

/// The fixed four-feature summary of one card's transaction history.
///
/// Field names on the wire match the model's training feature names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CardFeatures {
    #[serde(rename = "total_tx")]
    pub transaction_count: u64,
    #[serde(rename = "total_amt")]
    pub total_amount: f64,
    #[serde(rename = "unq_acquinstid")]
    pub distinct_acquirer_count: u64,
    /// Mean gap between consecutive transactions, 0 for a single transaction.
    #[serde(rename = "avg_days_bn_tx")]
    pub avg_days_between_tx: f64,
}

impl CardFeatures {
    /// Model input vector, ordered as in [`FEATURE_NAMES`].
    pub fn to_vector(&self) -> [f64; 4] {
        [
            self.transaction_count as f64,
            self.total_amount,
            self.distinct_acquirer_count as f64,
            self.avg_days_between_tx,
        ]
    }
}

/// Features combined across every card of one identity.
///
/// Same shape as [`CardFeatures`]; see `aggregation` for how each field is derived.
pub type CombinedFeatures = CardFeatures;

// ============ Risk Models ============

/// Credit risk classification derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    /// No card produced a score.
    Unknown,
}

impl RiskTier {
    /// Maps a score to a tier: `>= 750` LOW, `[500, 750)` MEDIUM, `< 500` HIGH.
    pub fn from_score(score: f64) -> Self {
        if score >= 750.0 {
            RiskTier::Low
        } else if score >= 500.0 {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
            RiskTier::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Masks a card number for logging, keeping the first 6 and last 4 characters.
///
/// Short values are masked entirely.
pub fn mask_card_number(card_number: &str) -> String {
    let chars: Vec<char> = card_number.chars().collect();
    if chars.len() <= 10 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 10), tail)
}
