use thiserror::Error;

pub type NotionResult<T> = Result<T, NotionError>;

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("Notion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notion API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Failed to decode Notion response: {0}")]
    Decode(String),
}

impl NotionError {
    /// True when Notion answered 404 for the requested object
    pub fn is_not_found(&self) -> bool {
        matches!(self, NotionError::Api { status: 404, .. })
    }
}
