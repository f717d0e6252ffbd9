use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use ait_membership::{Member, SignupRequest};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub member: Member,
}

/// POST /api/members
///
/// Registers an unpaid member from the join form. Rate limited per client IP.
pub async fn create_member(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MemberResponse>)> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected signup body");
        ApiError::Validation("Invalid request body".to_string())
    })?;

    let member = state.signup.register(&request).await?;
    Ok((StatusCode::CREATED, Json(MemberResponse { member })))
}
