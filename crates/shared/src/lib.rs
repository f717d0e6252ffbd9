// Test code patterns (expected in test files):
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! AiT Shared Library
//!
//! Pieces used by both the membership crate and the API server:
//!
//! - **Notion**: REST client plus a typed codec for page properties
//! - **Rate limiting**: in-memory fixed-window limiter for public endpoints

pub mod notion;
pub mod rate_limit;

pub use notion::{
    DateRange, FileObject, Filter, NotionClient, NotionError, NotionResult, Page, Properties,
    PropertyInput, PropertyValue, RichText, SelectOption,
};
pub use rate_limit::{RateLimitConfig, RateLimitResult, RateLimiter};
