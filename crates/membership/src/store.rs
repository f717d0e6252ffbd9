//! Member store abstraction
//!
//! The members database is reached only through this trait so reconciliation
//! and signup can run against Notion in production and a fake in tests.

use async_trait::async_trait;

use crate::error::MembershipResult;
use crate::identity::Identity;
use crate::member::{Member, MemberUpdate, NewMember};

#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Records whose student ID or email equals the identity's.
    ///
    /// Callers never pass an empty identity. Order of the result is not
    /// meaningful.
    async fn find_by_identity(&self, identity: &Identity) -> MembershipResult<Vec<Member>>;

    async fn create(&self, member: NewMember) -> MembershipResult<Member>;

    async fn update(&self, id: &str, update: MemberUpdate) -> MembershipResult<Member>;
}
