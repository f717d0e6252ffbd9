use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{
    content::Event,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
}

/// GET /api/events
pub async fn list_events(State(state): State<AppState>) -> ApiResult<Json<EventsResponse>> {
    let events = state.content.list_events().await?;
    Ok(Json(EventsResponse { events }))
}

/// GET /api/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Event>> {
    state
        .content
        .get_event(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))
}
