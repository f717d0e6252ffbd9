//! Member records and write payloads

use serde::Serialize;
use time::{Date, OffsetDateTime};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// A member as stored in the members database
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    /// Lowercased; empty when the record has no email
    pub email: String,
    pub student_id: Option<String>,
    pub phone: Option<String>,
    pub shirt_size: Option<String>,
    #[serde(with = "iso_date::option")]
    pub join_date: Option<Date>,
    /// `None` when missing or not a valid date
    #[serde(with = "iso_date::option")]
    pub expiration_date: Option<Date>,
    pub paid: bool,
    pub major: Option<String>,
    pub major_other: Option<String>,
    pub classification: Option<String>,
    pub minors: Vec<String>,
    #[serde(skip)]
    pub created_time: Option<OffsetDateTime>,
}

/// Fields for a record that does not exist yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub student_id: Option<String>,
    pub phone: Option<String>,
    pub shirt_size: Option<String>,
    pub join_date: Date,
    pub expiration_date: Option<Date>,
    /// Left unset by the signup form, which does not take payment
    pub paid: Option<bool>,
    pub major: Option<String>,
    pub major_other: Option<String>,
    pub classification: Option<String>,
    pub minors: Vec<String>,
}

impl NewMember {
    pub fn new(name: impl Into<String>, email: impl Into<String>, join_date: Date) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            student_id: None,
            phone: None,
            shirt_size: None,
            join_date,
            expiration_date: None,
            paid: None,
            major: None,
            major_other: None,
            classification: None,
            minors: Vec::new(),
        }
    }
}

/// Partial update; `None` fields are left untouched on the stored record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub shirt_size: Option<String>,
    pub join_date: Option<Date>,
    pub expiration_date: Option<Date>,
    pub paid: Option<bool>,
}

impl MemberUpdate {
    pub fn apply_to(&self, member: &mut Member) {
        if let Some(name) = &self.name {
            member.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            member.phone = Some(phone.clone());
        }
        if let Some(shirt_size) = &self.shirt_size {
            member.shirt_size = Some(shirt_size.clone());
        }
        if let Some(join_date) = self.join_date {
            member.join_date = Some(join_date);
        }
        if let Some(expiration_date) = self.expiration_date {
            member.expiration_date = Some(expiration_date);
        }
        if let Some(paid) = self.paid {
            member.paid = paid;
        }
    }
}
