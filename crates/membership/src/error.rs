//! Membership error types

use ait_shared::NotionError;
use thiserror::Error;

pub type MembershipResult<T> = Result<T, MembershipError>;

#[derive(Debug, Error)]
pub enum MembershipError {
    /// Missing credentials or database IDs, detected at request time
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Webhook signature invalid: {0}")]
    WebhookSignatureInvalid(String),

    #[error("Invalid webhook payload: {0}")]
    WebhookPayload(String),

    #[error("Member store error: {0}")]
    Store(#[from] NotionError),

    /// Field-level validation failures, each formatted as `field: message`
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Member already exists with this email or student ID")]
    DuplicateMember,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MembershipError {
    /// Whether the failure is the caller's fault (and retrying won't help)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MembershipError::WebhookSignatureInvalid(_)
                | MembershipError::Validation(_)
                | MembershipError::DuplicateMember
        )
    }
}
