use crate::detector::Detector;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Builder, interpreter and LLM client, all immutable after startup.
    pub detector: Detector,
    /// Upper bound on `texts` in one batch request.
    pub max_batch_size: usize,
}
