use crate::models::TransactionRecord;
use async_trait::async_trait;
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::NaiveDate;
use sqlx::PgPool;

/// Fixed date format of the `udate` column.
pub const TX_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A row was read but could not be converted into a transaction.
    #[error("invalid transaction row: {0}")]
    InvalidRow(String),
}

/// Source of card transaction histories.
///
/// An empty result means the card has no transactions; errors are reserved
/// for failures to query or decode the store.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// All transactions for exactly one card, ordered by date ascending.
    async fn fetch(&self, card_id: &str) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Connectivity check used by the readiness endpoint.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Raw row as stored; converted by [`parse_row`].
///
/// Only the date is mandatory. A row with a NULL `udate` fails to decode.
#[derive(Debug, sqlx::FromRow)]
pub struct TransactionRow {
    pub trans_type: Option<String>,
    pub actamt: Option<BigDecimal>,
    pub acqinstid: Option<String>,
    pub udate: String,
}

/// Convert a raw row, rejecting dates outside [`TX_DATE_FORMAT`].
///
/// NULL amounts and acquirers are kept as `None`.
pub fn parse_row(row: TransactionRow) -> Result<TransactionRecord, StoreError> {
    let date = NaiveDate::parse_from_str(row.udate.trim(), TX_DATE_FORMAT).map_err(|e| {
        StoreError::InvalidRow(format!("unparseable date '{}': {}", row.udate, e))
    })?;

    let amount = match &row.actamt {
        Some(actamt) => Some(
            actamt
                .to_f64()
                .filter(|a| a.is_finite())
                .ok_or_else(|| StoreError::InvalidRow(format!("unrepresentable amount {}", actamt)))?,
        ),
        None => None,
    };

    Ok(TransactionRecord {
        trans_type: row.trans_type,
        amount,
        acquirer_id: row.acqinstid,
        date,
    })
}

/// PostgreSQL-backed transaction store.
#[derive(Clone)]
pub struct PgTransactionStore {
    pool: PgPool,
    query: String,
}

impl PgTransactionStore {
    /// `table` must already be a validated identifier (see `Config`).
    pub fn new(pool: PgPool, table: &str) -> Self {
        let query = format!(
            "SELECT trans_type::text AS trans_type, actamt::numeric AS actamt, \
             acqinstid::text AS acqinstid, udate::text AS udate \
             FROM {} WHERE hpan = $1 ORDER BY udate",
            table
        );
        Self { pool, query }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn fetch(&self, card_id: &str) -> Result<Vec<TransactionRecord>, StoreError> {
        let rows = sqlx::query_as::<_, TransactionRow>(&self.query)
            .bind(card_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(parse_row).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn row(amount: &str, udate: &str) -> TransactionRow {
        TransactionRow {
            trans_type: Some("774".to_string()),
            actamt: Some(BigDecimal::from_str(amount).unwrap()),
            acqinstid: Some("100200".to_string()),
            udate: udate.to_string(),
        }
    }

    #[test]
    fn test_parse_row() {
        let record = parse_row(row("125.50", "20240311")).unwrap();

        assert_eq!(record.amount, Some(125.5));
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(record.acquirer_id.as_deref(), Some("100200"));
        assert_eq!(record.trans_type.as_deref(), Some("774"));
    }

    #[test]
    fn test_null_amount_is_kept() {
        let mut raw = row("1", "20240311");
        raw.actamt = None;

        let record = parse_row(raw).unwrap();
        assert_eq!(record.amount, None);
        assert_eq!(record.acquirer_id.as_deref(), Some("100200"));
    }

    #[test]
    fn test_null_acquirer_is_kept() {
        let mut raw = row("18.25", "20240311");
        raw.acqinstid = None;
        raw.trans_type = None;

        let record = parse_row(raw).unwrap();
        assert_eq!(record.acquirer_id, None);
        assert_eq!(record.trans_type, None);
        assert_eq!(record.amount, Some(18.25));
    }

    #[test]
    fn test_unparseable_date_is_store_error() {
        assert!(matches!(
            parse_row(row("1", "2024-03-11")),
            Err(StoreError::InvalidRow(_))
        ));
        assert!(matches!(
            parse_row(row("1", "20241341")),
            Err(StoreError::InvalidRow(_))
        ));
    }
}
