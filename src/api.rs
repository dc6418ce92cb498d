use std::sync::Arc;

use shuttle_axum::axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::feed::{
    self,
    config::DEFAULT_MAX_POSTS,
    fetcher::HttpTransport,
    types::{FeedSource, FeedTransport, Post},
};
use crate::summarize::{BlogSummarizer, SummarizeError, Summarizer};

#[derive(Clone)]
pub struct AppState {
    transport: Arc<dyn FeedTransport>,
    sources: Arc<Vec<FeedSource>>,
    max_posts: usize,
    summarizer: Arc<dyn Summarizer>,
}

impl AppState {
    pub fn new(
        transport: Arc<dyn FeedTransport>,
        sources: Vec<FeedSource>,
        max_posts: usize,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            transport,
            sources: Arc::new(sources),
            max_posts,
            summarizer,
        }
    }

    /// Production wiring: configured sources, HTTP transport, OpenAI summarizer.
    pub fn from_env() -> anyhow::Result<Self> {
        let sources = feed::config::load_sources()?;
        Ok(Self::new(
            Arc::new(HttpTransport::new()),
            sources,
            DEFAULT_MAX_POSTS,
            Arc::new(BlogSummarizer::from_env()),
        ))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/posts", get(fetch_posts))
        .route("/api/summarize", post(summarize_blog))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Serialize)]
struct PostsResp {
    posts: Vec<Post>,
}

#[derive(serde::Serialize)]
struct TakeawaysResp {
    takeaways: Vec<String>,
}

#[derive(serde::Serialize)]
struct ErrorResp {
    error: String,
}

/// Aggregate all configured feeds. Individual source failures are already
/// absorbed by the pipeline; sources that all fail still yield an empty
/// `posts` array with HTTP 200. The only error here is having nothing to
/// even attempt.
async fn fetch_posts(State(state): State<AppState>) -> Response {
    if state.sources.is_empty() {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "no feed sources configured",
        );
    }

    let posts = feed::aggregate(
        Arc::clone(&state.transport),
        &state.sources,
        state.max_posts,
    )
    .await;
    Json(PostsResp { posts }).into_response()
}

#[derive(serde::Deserialize)]
struct SummarizeReq {
    #[serde(default)]
    url: Option<String>,
}

async fn summarize_blog(
    State(state): State<AppState>,
    Json(body): Json<SummarizeReq>,
) -> Response {
    let url = body.url.unwrap_or_default();
    let url = url.trim();
    if url.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "URL is required");
    }

    tracing::info!(url = %url, "summarizing blog");
    match state.summarizer.takeaways(url).await {
        Ok(takeaways) => Json(TakeawaysResp { takeaways }).into_response(),
        Err(e) => error_response(status_for(&e), &e.to_string()),
    }
}

fn status_for(e: &SummarizeError) -> StatusCode {
    match e {
        SummarizeError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        SummarizeError::CreditsExhausted => StatusCode::PAYMENT_REQUIRED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResp {
            error: message.to_string(),
        }),
    )
        .into_response()
}
