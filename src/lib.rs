pub mod cache;
pub mod calendar;
pub mod config;
pub mod error;
pub mod listing;
pub mod models;
pub mod scraping;
pub mod web;

use std::sync::Arc;

use anyhow::{Context, Result};

use cache::ScheduleCache;
use config::AppConfig;
use scraping::PromsListing;
use web::AppState;

pub fn build_state(config: &AppConfig) -> AppState {
    let source = PromsListing::new(config.document_location());
    AppState {
        cache: Arc::new(ScheduleCache::new(source, config.cache_window)),
        venues: &listing::LONDON_VENUES,
    }
}

pub async fn run(config: AppConfig) -> Result<()> {
    let state = build_state(&config);
    let app = web::router(state, &config.static_dir);

    tracing::info!(
        addr = %config.bind_addr,
        source = ?config.document_location(),
        "starting proms server"
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
