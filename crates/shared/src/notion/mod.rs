//! Notion integration
//!
//! Notion databases are the system of record for members, officers and events.
//! Pages are read through [`PropertyValue`], an exhaustive decoder over the
//! property types we consume, and written through [`Properties`].

mod client;
mod error;
mod filter;
mod property;

pub use client::{NotionClient, DEFAULT_NOTION_API_URL, NOTION_VERSION};
pub use error::{NotionError, NotionResult};
pub use filter::Filter;
pub use property::{
    DateRange, FileObject, FileUrl, Page, Properties, PropertyInput, PropertyValue, RichText,
    SelectOption,
};
