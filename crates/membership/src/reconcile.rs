//! Membership reconciliation
//!
//! Turns a completed checkout into a paid membership. Per checkout:
//!
//! - no matching record: create one (`NEW`)
//! - matching record that is still active: leave it alone (`ACTIVE_SKIP`)
//! - matching record that lapsed or was never paid: renew it in place (`RENEW`)
//!
//! At most one write reaches the store per checkout. There is no locking
//! across checkouts; two concurrent first-time checkouts for the same person
//! can both create a record.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use time::{Date, UtcOffset};

use crate::checkout::CheckoutDetails;
use crate::error::MembershipResult;
use crate::identity::{resolve_member, Identity};
use crate::member::{Member, MemberUpdate, NewMember};
use crate::semester;
use crate::store::MemberStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipTransition {
    New,
    ActiveSkip,
    Renew,
}

impl fmt::Display for MembershipTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipTransition::New => write!(f, "NEW"),
            MembershipTransition::ActiveSkip => write!(f, "ACTIVE_SKIP"),
            MembershipTransition::Renew => write!(f, "RENEW"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    pub transition: MembershipTransition,
    /// Created, updated or untouched record
    pub member: Member,
}

/// Fields written when renewing `existing` from a new checkout
pub fn renewal_update(
    existing: &Member,
    details: &CheckoutDetails,
    join_date: Date,
    expiration_date: Date,
) -> MemberUpdate {
    let name = (details.has_real_name() && details.name != existing.name)
        .then(|| details.name.clone());

    MemberUpdate {
        name,
        phone: details.phone.clone(),
        shirt_size: details.shirt_size.clone(),
        join_date: Some(join_date),
        expiration_date: Some(expiration_date),
        paid: Some(true),
    }
}

#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn MemberStore>,
    utc_offset: UtcOffset,
}

impl MembershipService {
    pub fn new(store: Arc<dyn MemberStore>, utc_offset: UtcOffset) -> Self {
        Self { store, utc_offset }
    }

    /// Today's date in the organisation's local calendar
    pub fn today(&self) -> Date {
        semester::today(self.utc_offset)
    }

    pub async fn reconcile_checkout(
        &self,
        details: &CheckoutDetails,
    ) -> MembershipResult<ReconcileOutcome> {
        self.reconcile_checkout_on(details, self.today()).await
    }

    /// Reconcile as if the checkout completed on `today`
    pub async fn reconcile_checkout_on(
        &self,
        details: &CheckoutDetails,
        today: Date,
    ) -> MembershipResult<ReconcileOutcome> {
        let join_date = today;
        let expiration_date = semester::expiration_for(join_date);

        tracing::info!(
            name = %details.name,
            email = ?details.email,
            student_id = ?details.student_id,
            "Processing checkout"
        );

        let identity = Identity::new(details.student_id.as_deref(), details.email.as_deref());
        let existing = resolve_member(self.store.as_ref(), &identity).await?;

        let Some(existing) = existing else {
            let member = NewMember {
                name: details.name.clone(),
                email: details.email.clone().unwrap_or_default(),
                student_id: details.student_id.clone(),
                phone: details.phone.clone(),
                shirt_size: details.shirt_size.clone(),
                join_date,
                expiration_date: Some(expiration_date),
                paid: Some(true),
                major: None,
                major_other: None,
                classification: None,
                minors: Vec::new(),
            };

            let created = self.store.create(member).await?;
            tracing::info!(
                member_id = %created.id,
                expires = %expiration_date,
                transition = %MembershipTransition::New,
                "Created new member"
            );
            return Ok(ReconcileOutcome {
                transition: MembershipTransition::New,
                member: created,
            });
        };

        if semester::is_active(existing.paid, existing.expiration_date, today) {
            tracing::info!(
                member_id = %existing.id,
                expires = ?existing.expiration_date,
                transition = %MembershipTransition::ActiveSkip,
                "Member already active for this semester, skipping update"
            );
            return Ok(ReconcileOutcome {
                transition: MembershipTransition::ActiveSkip,
                member: existing,
            });
        }

        let update = renewal_update(&existing, details, join_date, expiration_date);
        let renewed = self.store.update(&existing.id, update).await?;
        tracing::info!(
            member_id = %renewed.id,
            previous_expiration = ?existing.expiration_date,
            expires = %expiration_date,
            transition = %MembershipTransition::Renew,
            "Renewed membership"
        );

        Ok(ReconcileOutcome {
            transition: MembershipTransition::Renew,
            member: renewed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::PLACEHOLDER_NAME;
    use time::macros::date;

    fn existing() -> Member {
        Member {
            id: "m1".into(),
            name: "Jane Doe".into(),
            email: "jane@uh.edu".into(),
            student_id: Some("1234567".into()),
            phone: Some("713-555-0100".into()),
            shirt_size: Some("S".into()),
            join_date: Some(date!(2024 - 09 - 01)),
            expiration_date: Some(date!(2024 - 12 - 20)),
            paid: true,
            major: None,
            major_other: None,
            classification: None,
            minors: vec![],
            created_time: None,
        }
    }

    fn details(name: &str) -> CheckoutDetails {
        CheckoutDetails {
            email: Some("jane@uh.edu".into()),
            name: name.into(),
            phone: None,
            student_id: Some("1234567".into()),
            shirt_size: None,
        }
    }

    #[test]
    fn test_renewal_keeps_fields_absent_from_checkout() {
        let update = renewal_update(
            &existing(),
            &details("Jane Doe"),
            date!(2025 - 02 - 01),
            date!(2025 - 05 - 20),
        );

        assert_eq!(update.name, None);
        assert_eq!(update.phone, None);
        assert_eq!(update.shirt_size, None);
        assert_eq!(update.paid, Some(true));
        assert_eq!(update.join_date, Some(date!(2025 - 02 - 01)));
        assert_eq!(update.expiration_date, Some(date!(2025 - 05 - 20)));
    }

    #[test]
    fn test_renewal_overwrites_supplied_fields() {
        let mut d = details("Jane Q. Doe");
        d.phone = Some("832-555-0199".into());
        d.shirt_size = Some("L".into());

        let update = renewal_update(&existing(), &d, date!(2025 - 02 - 01), date!(2025 - 05 - 20));
        assert_eq!(update.name.as_deref(), Some("Jane Q. Doe"));
        assert_eq!(update.phone.as_deref(), Some("832-555-0199"));
        assert_eq!(update.shirt_size.as_deref(), Some("L"));
    }

    #[test]
    fn test_placeholder_name_never_overwrites() {
        let update = renewal_update(
            &existing(),
            &details(PLACEHOLDER_NAME),
            date!(2025 - 02 - 01),
            date!(2025 - 05 - 20),
        );
        assert_eq!(update.name, None);
    }

    #[test]
    fn test_transition_display() {
        assert_eq!(MembershipTransition::New.to_string(), "NEW");
        assert_eq!(MembershipTransition::ActiveSkip.to_string(), "ACTIVE_SKIP");
        assert_eq!(MembershipTransition::Renew.to_string(), "RENEW");
    }
}
