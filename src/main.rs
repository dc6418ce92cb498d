//! blogpulse — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blogpulse::api::AppState;
use blogpulse::feed::config::DEFAULT_MAX_POSTS;
use blogpulse::metrics::Metrics;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("blogpulse=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // This enables FEEDS_CONFIG_PATH / OPENAI_API_KEY from .env.
    let _ = dotenvy::dotenv();

    init_tracing();

    let state = AppState::from_env().expect("failed to load feed sources");
    let metrics = Metrics::init(DEFAULT_MAX_POSTS);

    let router = blogpulse::create_router(state).merge(metrics.router());

    Ok(router.into())
}
