//! Axum route handlers for the Prediction API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::detector::AnalysisReport;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub results: Vec<AnalysisReport>,
    pub model_type: &'static str,
    pub total_texts: usize,
}

#[derive(Debug, Deserialize)]
pub struct PredictSingleRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PredictSingleResponse {
    pub text: String,
    #[serde(flatten)]
    pub report: AnalysisReport,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/predict
///
/// Analyzes a batch of texts. Results are returned in request order.
pub async fn handle_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    if request.texts.is_empty() {
        return Err(AppError::Validation("texts must be non-empty".to_string()));
    }
    if request.texts.len() > state.max_batch_size {
        return Err(AppError::Validation(format!(
            "at most {} texts may be analyzed per request",
            state.max_batch_size
        )));
    }
    if let Some(index) = request.texts.iter().position(|t| t.trim().is_empty()) {
        return Err(AppError::Validation(format!(
            "texts[{index}] cannot be empty"
        )));
    }

    let results = state.detector.analyze_batch(&request.texts).await?;

    Ok(Json(PredictResponse {
        total_texts: results.len(),
        results,
        model_type: "gemini",
    }))
}

/// POST /api/v1/predict/single
///
/// Analyzes one text and echoes it back alongside the result.
pub async fn handle_predict_single(
    State(state): State<AppState>,
    Json(request): Json<PredictSingleRequest>,
) -> Result<Json<PredictSingleResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let report = state.detector.analyze(&request.text).await?;

    Ok(Json(PredictSingleResponse {
        text: request.text,
        report,
    }))
}
