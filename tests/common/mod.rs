//! In-memory collaborators shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_credit_score_api::model_artifact::{CreditModel, InferenceError};
use rust_credit_score_api::models::TransactionRecord;
use rust_credit_score_api::transaction_store::{StoreError, TransactionStore};
use std::collections::{HashMap, HashSet};

/// Transaction store backed by a map; listed cards fail with a storage error.
#[derive(Default)]
pub struct FakeStore {
    transactions: HashMap<String, Vec<TransactionRecord>>,
    failing: HashSet<String>,
    down: bool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_card(mut self, card: &str, transactions: Vec<TransactionRecord>) -> Self {
        self.transactions.insert(card.to_string(), transactions);
        self
    }

    pub fn with_failing_card(mut self, card: &str) -> Self {
        self.failing.insert(card.to_string());
        self
    }

    /// Every call fails, including `ping`.
    pub fn unreachable() -> Self {
        Self {
            down: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl TransactionStore for FakeStore {
    async fn fetch(&self, card_id: &str) -> Result<Vec<TransactionRecord>, StoreError> {
        if self.down || self.failing.contains(card_id) {
            return Err(StoreError::InvalidRow(format!(
                "unparseable date 'garbage' for {}",
                card_id
            )));
        }
        Ok(self.transactions.get(card_id).cloned().unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if self.down {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

/// Store whose lookups panic, standing in for an unexpected fault.
pub struct PanicStore;

#[async_trait]
impl TransactionStore for PanicStore {
    async fn fetch(&self, card_id: &str) -> Result<Vec<TransactionRecord>, StoreError> {
        panic!("connection state corrupted while fetching {}", card_id);
    }
}

/// Scores every card by its total amount, so tests can pick scores through amounts.
pub struct AmountModel;

impl CreditModel for AmountModel {
    fn predict(&self, features: &[f64; 4]) -> Result<f64, InferenceError> {
        Ok(features[1])
    }
}

pub struct NanModel;

impl CreditModel for NanModel {
    fn predict(&self, _features: &[f64; 4]) -> Result<f64, InferenceError> {
        Ok(f64::NAN)
    }
}

pub fn tx(amount: f64, acquirer: &str, date: &str) -> TransactionRecord {
    TransactionRecord {
        trans_type: Some("774".to_string()),
        amount: Some(amount),
        acquirer_id: Some(acquirer.to_string()),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
    }
}
