use std::net::SocketAddr;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use factcheck::analysis::prompts::TEMPLATE_VERSION;
use factcheck::config::Config;
use factcheck::detector::Detector;
use factcheck::routes::build_router;
use factcheck::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // load .env if present; ignore if missing

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting factcheck API v{}", env!("CARGO_PKG_VERSION"));

    // Builder, interpreter and LLM client are built once and shared read-only
    let detector = Detector::from_config(&config)?;
    info!(
        "Detector initialized (model: {}, template v{}, max input {} chars)",
        detector.model(),
        TEMPLATE_VERSION,
        config.max_input_chars
    );

    let state = AppState {
        detector,
        max_batch_size: config.max_batch_size,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
