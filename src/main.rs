use rust_credit_score_api::{
    config::Config,
    db::Database,
    handlers::AppState,
    model_artifact::LoadedModel,
    pipeline::CreditScorePipeline,
    routes::{build_router, RateLimit},
    scoring::Scorer,
    transaction_store::PgTransactionStore,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Database connection.
/// - The credit model (optional; the service runs unscored without it).
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_credit_score_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Load the credit model once; a missing artifact is tolerated
    let model = LoadedModel::load_optional(&config.model_path)?;
    let scorer = Scorer::from_loaded(model);
    if !scorer.is_available() {
        tracing::warn!("Running without a credit model: all scores will be UNKNOWN");
    }

    // Initialize database connection pool
    let db = Database::new(&config.database_url, config.db_max_connections).await?;
    tracing::info!("Database connection pool established");

    let store = PgTransactionStore::new(db.pool.clone(), &config.transactions_table);
    let pipeline = CreditScorePipeline::new(Arc::new(store), scorer);
    let app_state = Arc::new(AppState::new(pipeline));

    // Configure rate limiter per IP
    let rate_limit = RateLimit {
        per_second: config.rate_limit_per_second,
        burst: config.rate_limit_burst,
    };
    let app = build_router(app_state, Some(rate_limit))?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
