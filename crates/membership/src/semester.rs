//! Semester expiration policy
//!
//! Memberships run per semester: anyone joining January through May is
//! covered until May 20, anyone joining June through December until
//! December 20 of the same year.

use time::{Date, Month, OffsetDateTime, UtcOffset};

const EXPIRATION_DAY: u8 = 20;

/// Expiration date for a membership starting on `join_date`
pub fn expiration_for(join_date: Date) -> Date {
    let month = if u8::from(join_date.month()) <= 5 {
        Month::May
    } else {
        Month::December
    };

    // May 20 and Dec 20 exist in every representable year
    Date::from_calendar_date(join_date.year(), month, EXPIRATION_DAY).unwrap_or(join_date)
}

/// Active means paid, a valid expiration date, and `today` not past it.
///
/// The boundary is inclusive: a membership expiring today is still active.
pub fn is_active(paid: bool, expiration_date: Option<Date>, today: Date) -> bool {
    match expiration_date {
        Some(expires) => paid && today <= expires,
        None => false,
    }
}

/// Calendar date right now at the given UTC offset
pub fn today(offset: UtcOffset) -> Date {
    OffsetDateTime::now_utc().to_offset(offset).date()
}
