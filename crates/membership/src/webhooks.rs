//! Stripe webhook handling
//!
//! Verifies the `Stripe-Signature` header over the raw request body and
//! dispatches completed checkouts to membership reconciliation. Nothing is
//! retried here: a failed reconciliation is reported to the caller so the
//! endpoint can answer 5xx and Stripe redelivers.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::checkout::{CheckoutDetails, CheckoutSession, StripeEvent, CHECKOUT_SESSION_COMPLETED};
use crate::error::{MembershipError, MembershipResult};
use crate::reconcile::{MembershipService, ReconcileOutcome};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload, matching Stripe's client libraries
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// What happened to a verified event
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Reconciled(ReconcileOutcome),
    Ignored { event_type: String },
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"` keyed with the endpoint secret
pub fn compute_signature(secret: &str, timestamp: i64, payload: &str) -> MembershipResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| {
        MembershipError::Configuration("Invalid webhook secret key".to_string())
    })?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Parsed `t=...,v1=...` header; Stripe may send several `v1` entries while a
/// secret is being rolled
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> MembershipResult<SignatureHeader> {
    let mut timestamp: Option<i64> = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        if let Some((key, value)) = part.trim().split_once('=') {
            match key {
                "t" => timestamp = value.parse().ok(),
                "v1" => signatures.push(value.to_string()),
                _ => {}
            }
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        MembershipError::WebhookSignatureInvalid("missing timestamp in signature header".into())
    })?;
    if signatures.is_empty() {
        return Err(MembershipError::WebhookSignatureInvalid(
            "no v1 signature in signature header".into(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

pub struct WebhookHandler {
    membership: MembershipService,
    webhook_secret: Option<String>,
}

impl WebhookHandler {
    pub fn new(membership: MembershipService, webhook_secret: Option<String>) -> Self {
        Self {
            membership,
            webhook_secret: webhook_secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_secret.is_some()
    }

    /// Verify and parse a Stripe webhook event
    pub fn verify_event(&self, payload: &str, signature: &str) -> MembershipResult<StripeEvent> {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        self.verify_event_at(payload, signature, now)
    }

    /// Verify against an explicit clock, in unix seconds
    pub fn verify_event_at(
        &self,
        payload: &str,
        signature: &str,
        now: i64,
    ) -> MembershipResult<StripeEvent> {
        let secret = self.webhook_secret.as_deref().ok_or_else(|| {
            MembershipError::Configuration("STRIPE_WEBHOOK_SECRET is not set.".to_string())
        })?;

        let header = parse_signature_header(signature)?;

        // Only stale payloads are refused; clock skew ahead of us is accepted
        let age = now.saturating_sub(header.timestamp);
        if age > SIGNATURE_TOLERANCE_SECS {
            tracing::warn!(
                timestamp = header.timestamp,
                now,
                age,
                "Webhook timestamp outside tolerance"
            );
            return Err(MembershipError::WebhookSignatureInvalid(
                "timestamp outside the tolerance zone".into(),
            ));
        }

        let expected = compute_signature(secret, header.timestamp, payload)?;
        let matched = header
            .signatures
            .iter()
            .any(|candidate| bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())));

        if !matched {
            tracing::warn!(
                candidates = header.signatures.len(),
                "Webhook signature mismatch"
            );
            return Err(MembershipError::WebhookSignatureInvalid(
                "no signatures found matching the expected signature for payload".into(),
            ));
        }

        let event: StripeEvent = serde_json::from_str(payload).map_err(|e| {
            tracing::error!(parse_error = %e, "Failed to parse webhook event JSON");
            MembershipError::WebhookPayload(e.to_string())
        })?;

        tracing::info!(
            event_type = %event.event_type,
            event_id = %event.id,
            livemode = event.livemode,
            "Received Stripe event"
        );

        Ok(event)
    }

    /// Handle a verified Stripe event
    pub async fn handle_event(&self, event: &StripeEvent) -> MembershipResult<WebhookOutcome> {
        match event.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => {
                let session: CheckoutSession =
                    serde_json::from_value(event.data.object.clone()).map_err(|e| {
                        MembershipError::WebhookPayload(format!(
                            "expected checkout session: {}",
                            e
                        ))
                    })?;

                if session.payment_status.as_deref().is_some_and(|s| s != "paid") {
                    tracing::warn!(
                        session_id = %session.id,
                        payment_status = ?session.payment_status,
                        "Checkout completed without a settled payment"
                    );
                }

                let details = CheckoutDetails::from_session(&session);
                let outcome = self.membership.reconcile_checkout(&details).await?;

                tracing::info!(
                    event_id = %event.id,
                    session_id = %session.id,
                    member_id = %outcome.member.id,
                    transition = %outcome.transition,
                    "Checkout reconciled"
                );
                Ok(WebhookOutcome::Reconciled(outcome))
            }
            other => {
                tracing::info!(
                    event_type = %other,
                    event_id = %event.id,
                    "Unhandled event type"
                );
                Ok(WebhookOutcome::Ignored {
                    event_type: other.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryMemberStore;
    use std::sync::Arc;
    use time::UtcOffset;

    const SECRET: &str = "whsec_test123secret456";
    const NOW: i64 = 1_760_000_000;

    fn handler() -> WebhookHandler {
        let store = Arc::new(InMemoryMemberStore::new());
        WebhookHandler::new(
            MembershipService::new(store, UtcOffset::UTC),
            Some(SECRET.to_string()),
        )
    }

    fn payload() -> String {
        serde_json::json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "created": NOW,
            "data": { "object": { "id": "cs_1" } }
        })
        .to_string()
    }

    fn header(secret: &str, timestamp: i64, payload: &str) -> String {
        format!(
            "t={},v1={}",
            timestamp,
            compute_signature(secret, timestamp, payload).unwrap()
        )
    }

    #[test]
    fn test_valid_signature() {
        let body = payload();
        let event = handler()
            .verify_event_at(&body, &header(SECRET, NOW, &body), NOW)
            .unwrap();
        assert_eq!(event.id, "evt_1");
        assert_eq!(event.event_type, CHECKOUT_SESSION_COMPLETED);
    }

    #[test]
    fn test_any_v1_may_match() {
        let body = payload();
        let good = compute_signature(SECRET, NOW, &body).unwrap();
        let sig = format!("t={},v1={},v1={},v0=legacy", NOW, "0".repeat(64), good);
        assert!(handler().verify_event_at(&body, &sig, NOW).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let body = payload();
        let err = handler()
            .verify_event_at(&body, &header("wrong_secret", NOW, &body), NOW)
            .unwrap_err();
        assert!(matches!(err, MembershipError::WebhookSignatureInvalid(_)));
    }

    #[test]
    fn test_modified_payload_rejected() {
        let body = payload();
        let sig = header(SECRET, NOW, &body);
        let tampered = body.replace("evt_1", "evt_2");
        assert!(handler().verify_event_at(&tampered, &sig, NOW).is_err());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let body = payload();
        let old = NOW - SIGNATURE_TOLERANCE_SECS - 1;
        let err = handler()
            .verify_event_at(&body, &header(SECRET, old, &body), NOW)
            .unwrap_err();
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn test_future_timestamp_accepted() {
        let body = payload();
        let ahead = NOW + SIGNATURE_TOLERANCE_SECS + 60;
        let event = handler()
            .verify_event_at(&body, &header(SECRET, ahead, &body), NOW)
            .unwrap();
        assert_eq!(event.id, "evt_1");
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let body = payload();
        let zeros = "0".repeat(64);
        let min = format!("t={},v1={}", i64::MIN, zeros);
        let err = handler().verify_event_at(&body, &min, NOW).unwrap_err();
        assert!(err.to_string().contains("tolerance"));

        let max = format!("t={},v1={}", i64::MAX, zeros);
        let err = handler().verify_event_at(&body, &max, NOW).unwrap_err();
        assert!(matches!(err, MembershipError::WebhookSignatureInvalid(_)));

        let err = handler()
            .verify_event_at(&body, &min, i64::MAX)
            .unwrap_err();
        assert!(err.to_string().contains("tolerance"));
    }

    #[test]
    fn test_malformed_headers_rejected() {
        let body = payload();
        for sig in ["garbage", "v1=abc", "t=123", "t=notanumber,v1=abc", ""] {
            let err = handler().verify_event_at(&body, sig, NOW).unwrap_err();
            assert!(
                matches!(err, MembershipError::WebhookSignatureInvalid(_)),
                "header {sig:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let store = Arc::new(InMemoryMemberStore::new());
        let handler = WebhookHandler::new(
            MembershipService::new(store, UtcOffset::UTC),
            Some(String::new()),
        );
        assert!(!handler.is_configured());

        let body = payload();
        let err = handler
            .verify_event_at(&body, &header(SECRET, NOW, &body), NOW)
            .unwrap_err();
        assert!(matches!(err, MembershipError::Configuration(_)));
    }

    #[test]
    fn test_signed_garbage_is_payload_error() {
        let body = "not json";
        let err = handler()
            .verify_event_at(body, &header(SECRET, NOW, body), NOW)
            .unwrap_err();
        assert!(matches!(err, MembershipError::WebhookPayload(_)));
    }

    #[tokio::test]
    async fn test_other_event_types_are_ignored() {
        let event: StripeEvent = serde_json::from_value(serde_json::json!({
            "id": "evt_2",
            "type": "invoice.paid",
            "data": { "object": {} }
        }))
        .unwrap();

        let outcome = handler().handle_event(&event).await.unwrap();
        assert_eq!(
            outcome,
            WebhookOutcome::Ignored {
                event_type: "invoice.paid".into()
            }
        );
    }
}
