pub mod health;
pub mod predict;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/models", get(health::models_handler))
        .route("/api/v1/predict", post(predict::handle_predict))
        .route("/api/v1/predict/single", post(predict::handle_predict_single))
        .with_state(state)
}
