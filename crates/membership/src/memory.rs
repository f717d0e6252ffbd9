//! In-memory member store for tests
//!
//! Counts writes so callers can assert that skipped reconciliations touched
//! nothing, and can be switched into a failing mode to simulate an
//! unreachable store.

use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::error::{MembershipError, MembershipResult};
use crate::identity::Identity;
use crate::member::{Member, MemberUpdate, NewMember};
use crate::store::MemberStore;

#[derive(Default)]
struct Inner {
    members: Vec<Member>,
    next_id: u64,
    writes: usize,
    failure: Option<String>,
}

#[derive(Clone, Default)]
pub struct InMemoryMemberStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryMemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members(members: Vec<Member>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                members,
                ..Default::default()
            })),
        }
    }

    pub async fn members(&self) -> Vec<Member> {
        self.inner.lock().await.members.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Member> {
        self.inner
            .lock()
            .await
            .members
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    /// Number of create and update calls that succeeded
    pub async fn write_count(&self) -> usize {
        self.inner.lock().await.writes
    }

    /// Make every subsequent operation fail with `message` (or recover with `None`)
    pub async fn set_failure(&self, message: Option<&str>) {
        self.inner.lock().await.failure = message.map(str::to_string);
    }
}

fn check_failure(inner: &Inner) -> MembershipResult<()> {
    match &inner.failure {
        Some(message) => Err(MembershipError::Internal(message.clone())),
        None => Ok(()),
    }
}

#[async_trait]
impl MemberStore for InMemoryMemberStore {
    async fn find_by_identity(&self, identity: &Identity) -> MembershipResult<Vec<Member>> {
        let inner = self.inner.lock().await;
        check_failure(&inner)?;

        Ok(inner
            .members
            .iter()
            .filter(|m| {
                let by_id = identity.student_id.is_some() && m.student_id == identity.student_id;
                let by_email = identity.email.as_deref() == Some(m.email.as_str());
                by_id || by_email
            })
            .cloned()
            .collect())
    }

    async fn create(&self, member: NewMember) -> MembershipResult<Member> {
        let mut inner = self.inner.lock().await;
        check_failure(&inner)?;

        inner.next_id += 1;
        let created = Member {
            id: format!("mem-{}", inner.next_id),
            name: member.name,
            email: member.email.to_lowercase(),
            student_id: member.student_id,
            phone: member.phone,
            shirt_size: member.shirt_size,
            join_date: Some(member.join_date),
            expiration_date: member.expiration_date,
            paid: member.paid.unwrap_or(false),
            major: member.major,
            major_other: member.major_other,
            classification: member.classification,
            minors: member.minors,
            created_time: Some(OffsetDateTime::now_utc()),
        };

        inner.members.push(created.clone());
        inner.writes += 1;
        Ok(created)
    }

    async fn update(&self, id: &str, update: MemberUpdate) -> MembershipResult<Member> {
        let mut inner = self.inner.lock().await;
        check_failure(&inner)?;

        let member = inner
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| MembershipError::Internal(format!("member {} not found", id)))?;
        update.apply_to(member);
        let updated = member.clone();

        inner.writes += 1;
        Ok(updated)
    }
}
