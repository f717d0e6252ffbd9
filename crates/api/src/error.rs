//! API error responses
//!
//! Every public endpoint except the Stripe webhook answers errors with a
//! `{"message": ...}` body. Server-side failures are logged in full and
//! reported to the client as a generic message.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use ait_membership::MembershipError;
use ait_shared::NotionError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after_seconds: u64,
    },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Upstream error: {0}")]
    Upstream(#[from] NotionError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Configuration(_) | ApiError::Upstream(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::Validation(errors) => ApiError::Validation(errors.join(", ")),
            MembershipError::WebhookSignatureInvalid(_)
            | MembershipError::WebhookPayload(_) => ApiError::Validation(err.to_string()),
            MembershipError::DuplicateMember => ApiError::Conflict(err.to_string()),
            MembershipError::Configuration(message) => ApiError::Configuration(message),
            MembershipError::Store(e) => ApiError::Upstream(e),
            MembershipError::Internal(message) => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut response = (status, Json(json!({ "message": message }))).into_response();

        if let ApiError::RateLimited {
            retry_after_seconds,
            ..
        } = self
        {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from(retry_after_seconds),
            );
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_lists_fields() {
        let err: ApiError = MembershipError::Validation(vec![
            "firstName: First name is required".into(),
            "studentId: Student ID must be exactly 7 digits".into(),
        ])
        .into();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "firstName: First name is required, studentId: Student ID must be exactly 7 digits"
        );
    }

    #[tokio::test]
    async fn test_duplicate_is_conflict() {
        let response = ApiError::from(MembershipError::DuplicateMember).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(response).await["message"],
            "Member already exists with this email or student ID"
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_detail() {
        let err: ApiError =
            MembershipError::Configuration("NOTION_MEMBERS_DB_ID is not set.".into()).into();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited {
            message: "Too many signup attempts.".into(),
            retry_after_seconds: 42,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
        assert_eq!(body_json(response).await["message"], "Too many signup attempts.");
    }
}
