// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod feed;
pub mod metrics;
pub mod share;
pub mod summarize;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::feed::types::{FeedSource, Post};
