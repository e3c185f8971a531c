use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};

use super::{render, AppState};
use crate::cache::Snapshot;
use crate::calendar;
use crate::error::ScheduleError;
use crate::listing;
use crate::models::Day;

/// A failed extraction pass, reported as a 500.
#[derive(Debug)]
pub struct AppError(ScheduleError);

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "schedule unavailable");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "the proms listing is unavailable right now",
        )
            .into_response()
    }
}

pub async fn listing_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let days = load_days(&state).await?;
    Ok(Html(render::listing_page(&days)))
}

pub async fn listing_json(State(state): State<AppState>) -> Result<Json<Vec<Day>>, AppError> {
    Ok(Json(load_days(&state).await?))
}

/// `GET /proms/{id}` or `/proms/{id}.ics`. Unknown ids get an empty 404.
pub async fn event_calendar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = id.strip_suffix(".ics").unwrap_or(&id).to_string();
    let cache = state.cache.clone();
    let lookup_id = id.clone();
    let ics = tokio::task::spawn_blocking(move || calendar::export(&cache, &lookup_id))
        .await
        .map_err(|err| ScheduleError::Join(err.to_string()))??;

    match ics {
        Some(body) => Ok(([(CONTENT_TYPE, calendar::CONTENT_TYPE)], body).into_response()),
        None => {
            tracing::debug!(%id, "no such prom");
            Ok(StatusCode::NOT_FOUND.into_response())
        }
    }
}

async fn load_days(state: &AppState) -> Result<Vec<Day>, ScheduleError> {
    let snapshot = load_snapshot(state).await?;
    Ok(listing::project_days(&snapshot.events, state.venues))
}

/// Extraction does blocking I/O, so it runs off the async workers.
async fn load_snapshot(state: &AppState) -> Result<Arc<Snapshot>, ScheduleError> {
    let cache = state.cache.clone();
    tokio::task::spawn_blocking(move || cache.get())
        .await
        .map_err(|err| ScheduleError::Join(err.to_string()))?
}
