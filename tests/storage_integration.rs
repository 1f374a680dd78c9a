use std::env;
use uuid::Uuid;

use rust_credit_score_api::db::Database;
use rust_credit_score_api::transaction_store::{PgTransactionStore, TransactionStore};

/// Integration smoke test for the PostgreSQL transaction store.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn fetch_transactions_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url, 2).await?;

    // Scratch table with the same column layout as the production ledger.
    let table = format!("curr_trans_test_{}", Uuid::new_v4().simple());
    sqlx::query(&format!(
        "CREATE TABLE {} (hpan TEXT, trans_type TEXT, actamt NUMERIC, acqinstid TEXT, udate TEXT)",
        table
    ))
    .execute(&db.pool)
    .await?;

    let hpan = "4111111111111111";
    for (amount, acquirer, udate) in [("200.00", "ACQ2", "20240111"), ("100.00", "ACQ1", "20240101")] {
        sqlx::query(&format!(
            "INSERT INTO {} (hpan, trans_type, actamt, acqinstid, udate) VALUES ($1, '774', $2::numeric, $3, $4)",
            table
        ))
        .bind(hpan)
        .bind(amount)
        .bind(acquirer)
        .bind(udate)
        .execute(&db.pool)
        .await?;
    }

    sqlx::query(&format!(
        "INSERT INTO {} (hpan, trans_type, actamt, acqinstid, udate) VALUES ($1, NULL, NULL, NULL, '20240120')",
        table
    ))
    .bind(hpan)
    .execute(&db.pool)
    .await?;

    let store = PgTransactionStore::new(db.pool.clone(), &table);
    let transactions = store.fetch(hpan).await;
    let missing = store.fetch("0000000000000000").await;

    sqlx::query(&format!("DROP TABLE {}", table))
        .execute(&db.pool)
        .await?;

    let transactions = transactions?;
    assert_eq!(transactions.len(), 3);
    assert!(transactions[0].date < transactions[1].date);
    assert_eq!(transactions[0].amount, Some(100.0));
    assert_eq!(transactions[2].amount, None);
    assert_eq!(transactions[2].acquirer_id, None);
    assert!(missing?.is_empty());

    store.ping().await?;
    Ok(())
}
