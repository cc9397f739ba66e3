use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::analysis::prompts::TEMPLATE_VERSION;
use crate::state::AppState;

const SERVICE: &str = "factcheck-api";

/// GET /health
/// Returns a simple status object with service version and the active model.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": SERVICE,
        "model": state.detector.model()
    }))
}

/// GET /models
pub async fn models_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "gemini": {
            "available": true,
            "name": state.detector.model(),
            "type": "Large Language Model",
            "template_version": TEMPLATE_VERSION,
            "capabilities": {
                "reasoning": true,
                "source_analysis": true,
                "red_flag_detection": true,
                "confidence_scoring": true,
                "detailed_explanations": true
            }
        }
    }))
}

/// GET /
/// API overview.
pub async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "AI Fake News Detector API",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.detector.model(),
        "endpoints": {
            "POST /api/v1/predict": "Analyze multiple texts",
            "POST /api/v1/predict/single": "Analyze a single text",
            "GET /health": "Health check",
            "GET /models": "Model information"
        }
    }))
}
