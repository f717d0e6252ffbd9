use axum::{extract::State, Json};
use serde::Serialize;

use crate::{content::Officer, error::ApiResult, state::AppState};

#[derive(Debug, Serialize)]
pub struct OfficersResponse {
    pub officers: Vec<Officer>,
}

/// GET /api/officers
pub async fn list_officers(State(state): State<AppState>) -> ApiResult<Json<OfficersResponse>> {
    let officers = state.content.list_officers().await?;
    tracing::debug!(count = officers.len(), "Officers listed");
    Ok(Json(OfficersResponse { officers }))
}
