// Test code patterns:
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! AiT API Library
//!
//! HTTP surface of the AiT backend: Stripe webhook intake, the join form,
//! and read-only officers and events.

pub mod config;
pub mod content;
pub mod error;
pub mod routes;
pub mod security;
pub mod state;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
