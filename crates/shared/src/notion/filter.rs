use serde_json::{json, Value};

/// Database query filter
///
/// Only the predicates the backend issues are modelled: equality on email and
/// rich text properties, combined with `or`.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    EmailEquals { property: String, value: String },
    RichTextEquals { property: String, value: String },
    Or(Vec<Filter>),
}

impl Filter {
    pub fn email_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::EmailEquals {
            property: property.into(),
            value: value.into(),
        }
    }

    pub fn rich_text_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::RichTextEquals {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Combine predicates with `or`, collapsing a single predicate to itself.
    ///
    /// Returns `None` when there is nothing to filter on.
    pub fn any(mut filters: Vec<Filter>) -> Option<Self> {
        match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Filter::Or(filters)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Filter::EmailEquals { property, value } => json!({
                "property": property,
                "email": { "equals": value },
            }),
            Filter::RichTextEquals { property, value } => json!({
                "property": property,
                "rich_text": { "equals": value },
            }),
            Filter::Or(filters) => json!({
                "or": filters.iter().map(Filter::to_json).collect::<Vec<_>>(),
            }),
        }
    }
}
