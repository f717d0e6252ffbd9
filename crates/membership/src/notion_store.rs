//! Members database backed by Notion

use ait_shared::notion::{Filter, NotionClient, Page, Properties, PropertyInput, PropertyValue};
use async_trait::async_trait;

use crate::error::{MembershipError, MembershipResult};
use crate::identity::Identity;
use crate::member::{Member, MemberUpdate, NewMember};
use crate::store::MemberStore;

/// Property names in the members database
pub mod fields {
    pub const NAME: &str = "Name";
    pub const NAME_LOWER: &str = "name";
    pub const EMAIL: &str = "Email";
    pub const STUDENT_ID: &str = "Student ID";
    pub const PHONE: &str = "Phone";
    pub const SHIRT_SIZE: &str = "Shirt Size";
    pub const JOIN_DATE: &str = "Join Date";
    pub const EXPIRATION_DATE: &str = "Expiration Date";
    pub const PAID: &str = "Paid";
    pub const MAJOR: &str = "Major";
    pub const MAJOR_OTHER: &str = "Major (Other)";
    pub const CLASSIFICATION: &str = "Classification";
    pub const MINOR: &str = "Minor";
}

/// Decode a members-database page.
///
/// Missing or mistyped properties fall back to: empty string for name and
/// email, `false` for paid, an empty list for minors, `None` for the rest.
pub fn member_from_page(page: &Page) -> Member {
    Member {
        id: page.id.clone(),
        name: page
            .text(&[fields::NAME, fields::NAME_LOWER])
            .unwrap_or_default(),
        email: page
            .lookup(&[fields::EMAIL], PropertyValue::email)
            .map(|e| e.to_lowercase())
            .unwrap_or_default(),
        student_id: page.text(&[fields::STUDENT_ID]),
        phone: page.lookup(&[fields::PHONE], PropertyValue::phone_number),
        shirt_size: page.select(&[fields::SHIRT_SIZE]),
        join_date: page.date(&[fields::JOIN_DATE]),
        expiration_date: page.date(&[fields::EXPIRATION_DATE]),
        paid: page
            .lookup(&[fields::PAID], PropertyValue::checkbox)
            .unwrap_or(false),
        major: page.select(&[fields::MAJOR]),
        major_other: page.text(&[fields::MAJOR_OTHER]),
        classification: page.select(&[fields::CLASSIFICATION]),
        minors: page
            .lookup(&[fields::MINOR], PropertyValue::multi_select_names)
            .unwrap_or_default(),
        created_time: page.created_time,
    }
}

/// Properties for creating `member`; absent optional fields are not written
pub fn properties_for_new(member: &NewMember) -> Properties {
    let email = Some(member.email.trim())
        .filter(|e| !e.is_empty())
        .map(|e| PropertyInput::Email(e.to_lowercase()));
    let minors = if member.minors.is_empty() {
        None
    } else {
        Some(PropertyInput::MultiSelect(member.minors.clone()))
    };

    Properties::new()
        .set(fields::NAME, PropertyInput::Title(member.name.clone()))
        .set_opt(fields::EMAIL, email)
        .set_opt(
            fields::STUDENT_ID,
            member.student_id.clone().map(PropertyInput::RichText),
        )
        .set_opt(
            fields::PHONE,
            member.phone.clone().map(PropertyInput::PhoneNumber),
        )
        .set_opt(
            fields::SHIRT_SIZE,
            member.shirt_size.clone().map(PropertyInput::Select),
        )
        .set(fields::JOIN_DATE, PropertyInput::Date(member.join_date))
        .set_opt(
            fields::EXPIRATION_DATE,
            member.expiration_date.map(PropertyInput::Date),
        )
        .set_opt(fields::PAID, member.paid.map(PropertyInput::Checkbox))
        .set_opt(fields::MAJOR, member.major.clone().map(PropertyInput::Select))
        .set_opt(
            fields::MAJOR_OTHER,
            member.major_other.clone().map(PropertyInput::RichText),
        )
        .set_opt(
            fields::CLASSIFICATION,
            member.classification.clone().map(PropertyInput::Select),
        )
        .set_opt(fields::MINOR, minors)
}

pub fn properties_for_update(update: &MemberUpdate) -> Properties {
    Properties::new()
        .set_opt(fields::NAME, update.name.clone().map(PropertyInput::Title))
        .set_opt(
            fields::PHONE,
            update.phone.clone().map(PropertyInput::PhoneNumber),
        )
        .set_opt(
            fields::SHIRT_SIZE,
            update.shirt_size.clone().map(PropertyInput::Select),
        )
        .set_opt(fields::JOIN_DATE, update.join_date.map(PropertyInput::Date))
        .set_opt(
            fields::EXPIRATION_DATE,
            update.expiration_date.map(PropertyInput::Date),
        )
        .set_opt(fields::PAID, update.paid.map(PropertyInput::Checkbox))
}

/// Identity query: student ID OR email
pub fn identity_filter(identity: &Identity) -> Option<Filter> {
    let mut predicates = Vec::new();
    if let Some(email) = &identity.email {
        predicates.push(Filter::email_equals(fields::EMAIL, email.clone()));
    }
    if let Some(student_id) = &identity.student_id {
        predicates.push(Filter::rich_text_equals(
            fields::STUDENT_ID,
            student_id.clone(),
        ));
    }
    Filter::any(predicates)
}

pub struct NotionMemberStore {
    client: Option<NotionClient>,
    database_id: Option<String>,
}

impl NotionMemberStore {
    /// Either argument may be missing; operations then fail with a
    /// configuration error instead of the process refusing to start.
    pub fn new(client: Option<NotionClient>, database_id: Option<String>) -> Self {
        Self {
            client,
            database_id: database_id.filter(|id| !id.trim().is_empty()),
        }
    }

    fn target(&self) -> MembershipResult<(&NotionClient, &str)> {
        let client = self.client.as_ref().ok_or_else(|| {
            MembershipError::Configuration(
                "Notion client is not initialized. Please set NOTION_TOKEN.".to_string(),
            )
        })?;
        let database_id = self.database_id.as_deref().ok_or_else(|| {
            MembershipError::Configuration("NOTION_MEMBERS_DB_ID is not set.".to_string())
        })?;
        Ok((client, database_id))
    }
}

#[async_trait]
impl MemberStore for NotionMemberStore {
    async fn find_by_identity(&self, identity: &Identity) -> MembershipResult<Vec<Member>> {
        let (client, database_id) = self.target()?;
        let filter = identity_filter(identity).ok_or_else(|| {
            MembershipError::Internal("member lookup requires a student ID or email".to_string())
        })?;

        let pages = client.query_database(database_id, Some(&filter)).await?;
        Ok(pages
            .iter()
            .filter(|page| !page.archived)
            .map(member_from_page)
            .collect())
    }

    async fn create(&self, member: NewMember) -> MembershipResult<Member> {
        let (client, database_id) = self.target()?;
        let page = client
            .create_page(database_id, &properties_for_new(&member))
            .await?;

        tracing::info!(member_id = %page.id, "Member record created in Notion");
        Ok(member_from_page(&page))
    }

    async fn update(&self, id: &str, update: MemberUpdate) -> MembershipResult<Member> {
        let (client, _) = self.target()?;
        let page = client
            .update_page(id, &properties_for_update(&update))
            .await?;

        tracing::info!(member_id = %page.id, "Member record updated in Notion");
        Ok(member_from_page(&page))
    }
}
