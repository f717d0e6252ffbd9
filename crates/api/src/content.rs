//! Officers and events, read straight from their Notion databases

use serde::Serialize;
use time::OffsetDateTime;

use ait_shared::{NotionClient, Page, PropertyValue};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Officer {
    pub id: String,
    pub name: String,
    pub position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Planned,
    Cancelled,
}

impl EventStatus {
    /// Unknown or missing statuses read as `Planned`
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("confirmed") => EventStatus::Confirmed,
            Some("cancelled") | Some("canceled") => EventStatus::Cancelled,
            _ => EventStatus::Planned,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    /// Start as stored in Notion, either `YYYY-MM-DD` or a full timestamp
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: EventStatus,
    pub published: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsvp_link: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub created_at: Option<OffsetDateTime>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub updated_at: Option<OffsetDateTime>,
}

/// Whole-number student IDs only; Notion stores numbers as floats
fn whole_number(value: &PropertyValue) -> Option<i64> {
    value
        .number()
        .filter(|n| n.is_finite() && n.fract() == 0.0)
        .map(|n| n as i64)
}

fn image_url(value: &PropertyValue) -> Option<String> {
    value.file_url().or_else(|| value.url())
}

pub fn officer_from_page(page: &Page) -> Officer {
    Officer {
        id: page.id.clone(),
        name: page.text(&["name", "Name"]).unwrap_or_default(),
        position: page.select(&["position", "Position"]).unwrap_or_default(),
        status: page.select(&["status", "Status"]),
        student_id: page.lookup(&["student_id", "Student_id"], whole_number),
        image_url: page.lookup(&["image", "Image"], image_url),
        major: page.select(&["major", "Major"]),
        linkedin_url: page.lookup(&["linkedin", "LinkedIn"], PropertyValue::url),
    }
}

pub fn event_from_page(page: &Page) -> Event {
    Event {
        id: page.id.clone(),
        name: page.text(&["Name", "name"]).unwrap_or_default(),
        date: page
            .lookup(&["Date", "date"], PropertyValue::date_start_raw)
            .unwrap_or_default(),
        end_date: page.lookup(&["Date", "date"], PropertyValue::date_end_raw),
        location: page.text(&["Location", "location"]),
        description: page.text(&["Description", "description"]),
        status: EventStatus::parse(page.select(&["Status", "status"]).as_deref()),
        published: page
            .lookup(&["Published", "published"], PropertyValue::checkbox)
            .unwrap_or(false),
        rsvp_link: page.lookup(&["RSVP Link", "rsvpLink"], PropertyValue::url),
        created_at: page.created_time,
        updated_at: page.last_edited_time,
    }
}

/// Read access to the officers and events databases
#[derive(Clone)]
pub struct ContentRepository {
    client: Option<NotionClient>,
    officers_db_id: Option<String>,
    events_db_id: Option<String>,
}

impl ContentRepository {
    pub fn new(
        client: Option<NotionClient>,
        officers_db_id: Option<String>,
        events_db_id: Option<String>,
    ) -> Self {
        Self {
            client,
            officers_db_id,
            events_db_id,
        }
    }

    fn client(&self) -> ApiResult<&NotionClient> {
        self.client.as_ref().ok_or_else(|| {
            ApiError::Configuration(
                "Notion client is not initialized. Please set NOTION_TOKEN.".to_string(),
            )
        })
    }

    pub async fn list_officers(&self) -> ApiResult<Vec<Officer>> {
        let client = self.client()?;
        let db_id = self.officers_db_id.as_deref().ok_or_else(|| {
            ApiError::Configuration("NOTION_OFFICERS_DB_ID is not set.".to_string())
        })?;

        let pages = client.query_database(db_id, None).await?;
        Ok(pages
            .iter()
            .filter(|page| !page.archived)
            .map(officer_from_page)
            .collect())
    }

    pub async fn list_events(&self) -> ApiResult<Vec<Event>> {
        let client = self.client()?;
        let db_id = self.events_db_id.as_deref().ok_or_else(|| {
            ApiError::Configuration("NOTION_EVENTS_DB_ID is not set.".to_string())
        })?;

        let pages = client.query_database(db_id, None).await?;
        Ok(pages
            .iter()
            .filter(|page| !page.archived)
            .map(event_from_page)
            .collect())
    }

    /// `None` when Notion has no such page, or it was archived
    pub async fn get_event(&self, id: &str) -> ApiResult<Option<Event>> {
        let client = self.client()?;
        if self.events_db_id.is_none() {
            return Err(ApiError::Configuration(
                "NOTION_EVENTS_DB_ID is not set.".to_string(),
            ));
        }

        let page = client.retrieve_page(id).await?;
        Ok(page.filter(|p| !p.archived).map(|p| event_from_page(&p)))
    }
}
