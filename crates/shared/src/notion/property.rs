//! Typed Notion page properties
//!
//! Reading goes through [`PropertyValue`], a tagged enum with one variant per
//! property type we understand and an `Unsupported` catch-all, so a database
//! column of an unexpected type decodes to "absent" instead of failing the
//! whole page. Writing goes through [`PropertyInput`] collected in
//! [`Properties`].

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::{json, Map, Value};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// A Notion page as returned by query, create, update and retrieve
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_edited_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl Page {
    /// Extract a value from the first of `names` that yields one.
    ///
    /// Databases maintained by hand are inconsistent about capitalisation
    /// (`name` vs `Name`), so lookups accept several spellings in order.
    pub fn lookup<T>(
        &self,
        names: &[&str],
        extract: impl Fn(&PropertyValue) -> Option<T>,
    ) -> Option<T> {
        names
            .iter()
            .filter_map(|name| self.properties.get(*name))
            .find_map(extract)
    }

    pub fn text(&self, names: &[&str]) -> Option<String> {
        self.lookup(names, PropertyValue::plain_text)
    }

    pub fn select(&self, names: &[&str]) -> Option<String> {
        self.lookup(names, PropertyValue::select_name)
    }

    pub fn date(&self, names: &[&str]) -> Option<Date> {
        self.lookup(names, PropertyValue::date_start)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileUrl {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileObject {
    External { external: FileUrl },
    File { file: FileUrl },
    #[serde(other)]
    Unsupported,
}

/// Value of a single page property, keyed by Notion's `type` field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Email {
        email: Option<String>,
    },
    Select {
        select: Option<SelectOption>,
    },
    Status {
        status: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Date {
        date: Option<DateRange>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    PhoneNumber {
        phone_number: Option<String>,
    },
    Number {
        number: Option<f64>,
    },
    Url {
        url: Option<String>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileObject>,
    },
    #[serde(other)]
    Unsupported,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn join_segments(segments: &[RichText]) -> Option<String> {
    let joined: String = segments.iter().map(|s| s.plain_text.as_str()).collect();
    non_empty(&joined)
}

/// Parse the calendar-date prefix of a Notion date string.
///
/// Notion returns either `2025-05-20` or a full timestamp such as
/// `2025-05-20T09:00:00.000-05:00`; only the date part is meaningful here.
pub fn parse_date(value: &str) -> Option<Date> {
    let day = value.get(..10)?;
    Date::parse(day, format_description!("[year]-[month]-[day]")).ok()
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

impl PropertyValue {
    /// Text of a title or rich text property (segments concatenated)
    pub fn plain_text(&self) -> Option<String> {
        match self {
            PropertyValue::Title { title } => join_segments(title),
            PropertyValue::RichText { rich_text } => join_segments(rich_text),
            _ => None,
        }
    }

    pub fn email(&self) -> Option<String> {
        match self {
            PropertyValue::Email { email } => email.as_deref().and_then(non_empty),
            _ => None,
        }
    }

    /// Option name of a select or status property
    pub fn select_name(&self) -> Option<String> {
        match self {
            PropertyValue::Select { select } => select.as_ref().and_then(|s| non_empty(&s.name)),
            PropertyValue::Status { status } => status.as_ref().and_then(|s| non_empty(&s.name)),
            _ => None,
        }
    }

    pub fn multi_select_names(&self) -> Option<Vec<String>> {
        match self {
            PropertyValue::MultiSelect { multi_select } => Some(
                multi_select
                    .iter()
                    .filter_map(|option| non_empty(&option.name))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Raw start string of a date property
    pub fn date_start_raw(&self) -> Option<String> {
        match self {
            PropertyValue::Date { date: Some(range) } => non_empty(&range.start),
            _ => None,
        }
    }

    pub fn date_end_raw(&self) -> Option<String> {
        match self {
            PropertyValue::Date { date: Some(range) } => range.end.as_deref().and_then(non_empty),
            _ => None,
        }
    }

    /// Calendar date of a date property's start, `None` when absent or unparseable
    pub fn date_start(&self) -> Option<Date> {
        self.date_start_raw().as_deref().and_then(parse_date)
    }

    pub fn checkbox(&self) -> Option<bool> {
        match self {
            PropertyValue::Checkbox { checkbox } => Some(*checkbox),
            _ => None,
        }
    }

    pub fn phone_number(&self) -> Option<String> {
        match self {
            PropertyValue::PhoneNumber { phone_number } => {
                phone_number.as_deref().and_then(non_empty)
            }
            _ => None,
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number { number } => *number,
            _ => None,
        }
    }

    pub fn url(&self) -> Option<String> {
        match self {
            PropertyValue::Url { url } => url.as_deref().and_then(non_empty),
            _ => None,
        }
    }

    /// URL of the first file in a files property
    pub fn file_url(&self) -> Option<String> {
        match self {
            PropertyValue::Files { files } => files.iter().find_map(|file| match file {
                FileObject::External { external } => non_empty(&external.url),
                FileObject::File { file } => non_empty(&file.url),
                FileObject::Unsupported => None,
            }),
            _ => None,
        }
    }
}

/// A property value to write
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyInput {
    Title(String),
    RichText(String),
    Email(String),
    Select(String),
    MultiSelect(Vec<String>),
    Date(Date),
    Checkbox(bool),
    PhoneNumber(String),
}

impl PropertyInput {
    pub fn to_json(&self) -> Value {
        match self {
            PropertyInput::Title(content) => json!({ "title": [{ "text": { "content": content } }] }),
            PropertyInput::RichText(content) => {
                json!({ "rich_text": [{ "text": { "content": content } }] })
            }
            PropertyInput::Email(email) => json!({ "email": email }),
            PropertyInput::Select(name) => json!({ "select": { "name": name } }),
            PropertyInput::MultiSelect(names) => json!({
                "multi_select": names.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>(),
            }),
            PropertyInput::Date(date) => json!({ "date": { "start": format_date(*date) } }),
            PropertyInput::Checkbox(checked) => json!({ "checkbox": checked }),
            PropertyInput::PhoneNumber(phone) => json!({ "phone_number": phone }),
        }
    }
}

/// Ordered set of properties for a create or update request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(BTreeMap<String, PropertyInput>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &str, value: PropertyInput) -> Self {
        self.0.insert(name.to_string(), value);
        self
    }

    /// Set the property only when a value is present
    pub fn set_opt(self, name: &str, value: Option<PropertyInput>) -> Self {
        match value {
            Some(value) => self.set(name, value),
            None => self,
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropertyInput> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}
