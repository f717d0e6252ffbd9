//! Identity resolution
//!
//! Finds the existing record for a (student ID, email) pair. When several
//! records come back the choice is deterministic:
//!
//! 1. a record whose student ID matches beats one matched only by email;
//! 2. among equals, the earliest-created record wins (records with no
//!    creation time sort last);
//! 3. remaining ties break on record ID.

use std::cmp::Ordering;

use crate::error::MembershipResult;
use crate::member::Member;
use crate::store::MemberStore;

/// Normalised lookup key; blank values count as absent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub student_id: Option<String>,
    /// Lowercased
    pub email: Option<String>,
}

impl Identity {
    pub fn new(student_id: Option<&str>, email: Option<&str>) -> Self {
        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            student_id: clean(student_id),
            email: clean(email).map(|e| e.to_lowercase()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.student_id.is_none() && self.email.is_none()
    }

    fn rank(&self, member: &Member) -> u8 {
        let student_id_match = matches!(
            (&self.student_id, &member.student_id),
            (Some(wanted), Some(found)) if wanted == found.trim()
        );
        let email_match = self
            .email
            .as_deref()
            .is_some_and(|wanted| wanted.eq_ignore_ascii_case(member.email.trim()));

        match (student_id_match, email_match) {
            (true, _) => 0,
            (false, true) => 1,
            // Returned by the store but matches neither exactly
            (false, false) => 2,
        }
    }
}

fn created_order(a: &Member, b: &Member) -> Ordering {
    match (a.created_time, b.created_time) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Pick the best candidate for `identity` from store results
pub fn select_match(identity: &Identity, candidates: Vec<Member>) -> Option<Member> {
    candidates.into_iter().min_by(|a, b| {
        identity
            .rank(a)
            .cmp(&identity.rank(b))
            .then_with(|| created_order(a, b))
            .then_with(|| a.id.cmp(&b.id))
    })
}

/// Look up the existing member for `identity`, `None` without querying when
/// the identity is empty
pub async fn resolve_member(
    store: &dyn MemberStore,
    identity: &Identity,
) -> MembershipResult<Option<Member>> {
    if identity.is_empty() {
        tracing::debug!("No student ID or email on checkout; skipping member lookup");
        return Ok(None);
    }

    let candidates = store.find_by_identity(identity).await?;
    if candidates.len() > 1 {
        tracing::warn!(
            candidates = candidates.len(),
            student_id = ?identity.student_id,
            email = ?identity.email,
            "Multiple member records match identity"
        );
    }

    Ok(select_match(identity, candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn member(id: &str, student_id: Option<&str>, email: &str) -> Member {
        Member {
            id: id.into(),
            name: id.into(),
            email: email.into(),
            student_id: student_id.map(Into::into),
            phone: None,
            shirt_size: None,
            join_date: None,
            expiration_date: None,
            paid: false,
            major: None,
            major_other: None,
            classification: None,
            minors: vec![],
            created_time: None,
        }
    }

    #[test]
    fn test_normalises_identity() {
        let identity = Identity::new(Some("  "), Some(" Jane@UH.edu "));
        assert_eq!(identity.student_id, None);
        assert_eq!(identity.email.as_deref(), Some("jane@uh.edu"));
        assert!(Identity::new(None, Some("")).is_empty());
    }

    #[test]
    fn test_student_id_match_beats_email_match() {
        let identity = Identity::new(Some("1234567"), Some("jane@uh.edu"));
        let by_email = member("email-match", Some("7654321"), "jane@uh.edu");
        let by_id = member("id-match", Some("1234567"), "other@uh.edu");

        let chosen = select_match(&identity, vec![by_email, by_id]).unwrap();
        assert_eq!(chosen.id, "id-match");
    }

    #[test]
    fn test_earliest_created_wins_among_email_matches() {
        let identity = Identity::new(None, Some("jane@uh.edu"));
        let mut newer = member("a-newer", None, "jane@uh.edu");
        newer.created_time = Some(datetime!(2025-02-01 0:00 UTC));
        let mut older = member("z-older", None, "jane@uh.edu");
        older.created_time = Some(datetime!(2024-09-01 0:00 UTC));
        let undated = member("0-undated", None, "jane@uh.edu");

        let chosen = select_match(&identity, vec![newer, undated, older]).unwrap();
        assert_eq!(chosen.id, "z-older");
    }

    #[test]
    fn test_id_breaks_remaining_ties() {
        let identity = Identity::new(None, Some("jane@uh.edu"));
        let chosen = select_match(
            &identity,
            vec![
                member("b", None, "jane@uh.edu"),
                member("a", None, "jane@uh.edu"),
            ],
        )
        .unwrap();
        assert_eq!(chosen.id, "a");
    }

    #[test]
    fn test_email_match_is_case_insensitive() {
        let identity = Identity::new(None, Some("jane@uh.edu"));
        let stored = member("m1", None, "Jane@UH.edu");
        assert_eq!(identity.rank(&stored), 1);
    }

    #[test]
    fn test_no_candidates() {
        let identity = Identity::new(Some("1234567"), None);
        assert!(select_match(&identity, vec![]).is_none());
    }
}
