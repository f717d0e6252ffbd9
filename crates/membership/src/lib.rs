// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! AiT Membership Module
//!
//! Keeps the Notion members database in step with Stripe payments and the
//! website's join form.
//!
//! ## Features
//!
//! - **Webhooks**: Verify Stripe signatures and dispatch completed checkouts
//! - **Reconciliation**: Create, skip or renew a membership per checkout
//! - **Identity Resolution**: Deterministic match on student ID or email
//! - **Semester Policy**: May 20 / December 20 expiration windows
//! - **Direct Signup**: Validated, duplicate-checked unpaid registration

pub mod checkout;
pub mod error;
pub mod identity;
pub mod member;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod notion_store;
pub mod reconcile;
pub mod semester;
pub mod signup;
pub mod store;
pub mod webhooks;


// Checkout
pub use checkout::{CheckoutDetails, CheckoutSession, StripeEvent, CHECKOUT_SESSION_COMPLETED};

// Error
pub use error::{MembershipError, MembershipResult};

// Identity
pub use identity::{resolve_member, select_match, Identity};

// Member
pub use member::{Member, MemberUpdate, NewMember};

// Memory
#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryMemberStore;

// Notion store
pub use notion_store::NotionMemberStore;

// Reconciliation
pub use reconcile::{MembershipService, MembershipTransition, ReconcileOutcome};

// Signup
pub use signup::{SignupRequest, SignupService, ValidatedSignup};

// Store
pub use store::MemberStore;

// Webhooks
pub use webhooks::{WebhookHandler, WebhookOutcome};
