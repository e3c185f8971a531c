//! HTTP surface: the listing page, its JSON twin, per-event calendar files
//! and static assets.

pub mod handlers;
pub mod render;

use std::path::Path;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::ScheduleCache;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ScheduleCache>,
    pub venues: &'static [&'static str],
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/proms/", get(handlers::listing_page))
        .route("/proms/schedule.json", get(handlers::listing_json))
        .route("/proms/:id", get(handlers::event_calendar))
        .nest_service("/proms/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
