use crate::errors::AppError;
use crate::models::mask_card_number;
use crate::pipeline::CreditScorePipeline;
use crate::score_models::{CardEntry, CreditScoreRequest, CreditScoreResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Everything here is read-only; each request builds its own accumulator.
#[derive(Clone)]
pub struct AppState {
    /// Scoring pipeline with its injected store and model.
    pub pipeline: CreditScorePipeline,
}

impl AppState {
    pub fn new(pipeline: CreditScorePipeline) -> Self {
        Self { pipeline }
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and the loaded model (or `null` when
/// running without one).
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let scorer = state.pipeline.scorer();
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-credit-score-api",
            "version": env!("CARGO_PKG_VERSION"),
            "model_available": scorer.is_available(),
            "model": scorer.model_info(),
        })),
    )
}

/// GET /health/ready
///
/// Readiness check: verifies that the transaction store answers.
pub async fn ready(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    state
        .pipeline
        .store()
        .ping()
        .await
        .map_err(|e| AppError::ServiceUnavailable(format!("transaction store: {}", e)))?;

    Ok((StatusCode::OK, Json(json!({ "status": "ready" }))))
}

/// POST /api/v1/credit-score (also served as POST /predict)
///
/// Scores every card of an identity and returns the combined score, tier and
/// features along with per-card results. Only malformed requests fail as a
/// whole; card-level failures are reported in `results`.
///
/// # Returns
///
/// * `Result<Json<CreditScoreResponse>, AppError>` - The combined score or a 400 error.
pub async fn credit_score(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreditScoreRequest>, JsonRejection>,
) -> Result<Json<CreditScoreResponse>, AppError> {
    let Json(request) = payload?;

    let identity_id = request
        .identity()
        .ok_or_else(|| AppError::BadRequest("identity_id is required".to_string()))?;

    let entries: Vec<&CardEntry> = request.card_entries().collect();
    let card_numbers: Vec<&str> = entries.iter().filter_map(|e| e.card_number()).collect();

    tracing::info!(
        "POST /credit-score - {} card(s): [{}]",
        card_numbers.len(),
        card_numbers
            .iter()
            .map(|c| mask_card_number(c))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let report = state.pipeline.run(card_numbers).await;

    let response = CreditScoreResponse::build(
        identity_id,
        &entries,
        &report,
        request.callback_url.as_deref(),
    );

    Ok(Json(response))
}
