//! Stripe webhook endpoint
//!
//! Stripe needs the body exactly as sent to check the signature, so the
//! handler takes raw bytes. Errors use `{"error": ...}` bodies; a 5xx makes
//! Stripe redeliver, a 4xx does not.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use ait_membership::{MembershipError, WebhookOutcome};

use crate::state::AppState;

const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Webhook secret not configured")]
    NotConfigured,
    #[error("Missing signature")]
    MissingSignature,
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("Processing failed")]
    ProcessingFailed,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match self {
            WebhookError::NotConfigured | WebhookError::ProcessingFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature(_)
            | WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn verification_error(err: MembershipError) -> WebhookError {
    match err {
        MembershipError::WebhookSignatureInvalid(message) => {
            tracing::warn!(reason = %message, "Webhook signature verification failed");
            WebhookError::InvalidSignature(message)
        }
        MembershipError::WebhookPayload(message) => WebhookError::InvalidPayload(message),
        MembershipError::Configuration(message) => {
            tracing::error!(reason = %message, "Webhook handler misconfigured");
            WebhookError::NotConfigured
        }
        other => {
            tracing::error!(error = %other, "Webhook verification failed");
            WebhookError::ProcessingFailed
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /api/webhooks/stripe
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, WebhookError> {
    if !state.webhooks.is_configured() {
        tracing::error!("STRIPE_WEBHOOK_SECRET is not set.");
        return Err(WebhookError::NotConfigured);
    }

    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing stripe-signature header");
            WebhookError::MissingSignature
        })?;

    let payload = std::str::from_utf8(&body)
        .map_err(|_| WebhookError::InvalidPayload("body is not valid UTF-8".to_string()))?;

    let event = state
        .webhooks
        .verify_event(payload, signature)
        .map_err(verification_error)?;

    match state.webhooks.handle_event(&event).await {
        Ok(WebhookOutcome::Reconciled(outcome)) => {
            tracing::debug!(
                event_id = %event.id,
                transition = %outcome.transition,
                "Webhook acknowledged"
            );
        }
        Ok(WebhookOutcome::Ignored { .. }) => {}
        Err(MembershipError::WebhookPayload(message)) => {
            tracing::warn!(event_id = %event.id, reason = %message, "Unusable webhook payload");
            return Err(WebhookError::InvalidPayload(message));
        }
        Err(e) => {
            tracing::error!(event_id = %event.id, error = %e, "Webhook processing error");
            return Err(WebhookError::ProcessingFailed);
        }
    }

    Ok(Json(WebhookAck { received: true }))
}
