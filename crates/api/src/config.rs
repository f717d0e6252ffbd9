//! Server configuration loaded from the environment

use time::UtcOffset;

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub notion_token: Option<String>,
    pub notion_api_url: String,
    pub notion_members_db_id: Option<String>,
    pub notion_officers_db_id: Option<String>,
    pub notion_events_db_id: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    /// Offset used to decide "today" for semester expiration
    pub membership_utc_offset: UtcOffset,
    pub allowed_origins: Vec<String>,
    /// Key rate limits on `X-Forwarded-For` / `X-Real-IP` instead of the
    /// socket peer; only safe behind a proxy that overwrites them
    pub trust_proxy_headers: bool,
}

/// Read a variable, treating unset and blank the same
fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name: "PORT",
        expected: "a TCP port number",
        value: value.to_string(),
    })
}

fn parse_utc_offset(value: &str) -> Result<UtcOffset, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name: "MEMBERSHIP_UTC_OFFSET_HOURS",
        expected: "a whole number of hours between -23 and 23",
        value: value.to_string(),
    };
    let hours: i8 = value.parse().map_err(|_| invalid())?;
    if !(-23..=23).contains(&hours) {
        return Err(invalid());
    }
    UtcOffset::from_hms(hours, 0, 0).map_err(|_| invalid())
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "true or false",
            value: value.to_string(),
        }),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_address = match optional("BIND_ADDRESS") {
            Some(address) => address,
            None => {
                let port = match optional("PORT") {
                    Some(port) => parse_port(&port)?,
                    None => DEFAULT_PORT,
                };
                format!("0.0.0.0:{}", port)
            }
        };

        let membership_utc_offset = match optional("MEMBERSHIP_UTC_OFFSET_HOURS") {
            Some(hours) => parse_utc_offset(&hours)?,
            None => UtcOffset::UTC,
        };

        let allowed_origins = optional("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let trust_proxy_headers = match optional("TRUST_PROXY_HEADERS") {
            Some(value) => parse_bool("TRUST_PROXY_HEADERS", &value)?,
            None => false,
        };

        let config = Self {
            bind_address,
            notion_token: optional("NOTION_TOKEN"),
            notion_api_url: optional("NOTION_API_URL")
                .unwrap_or_else(|| ait_shared::notion::DEFAULT_NOTION_API_URL.to_string()),
            notion_members_db_id: optional("NOTION_MEMBERS_DB_ID"),
            notion_officers_db_id: optional("NOTION_OFFICERS_DB_ID"),
            notion_events_db_id: optional("NOTION_EVENTS_DB_ID"),
            stripe_webhook_secret: optional("STRIPE_WEBHOOK_SECRET"),
            membership_utc_offset,
            allowed_origins,
            trust_proxy_headers,
        };
        config.warn_missing();
        Ok(config)
    }

    fn warn_missing(&self) {
        if self.notion_token.is_none() {
            tracing::warn!("NOTION_TOKEN is not set. Notion integration will not work.");
        }
        if self.notion_members_db_id.is_none() {
            tracing::warn!("NOTION_MEMBERS_DB_ID is not set. Membership endpoints will not work.");
        }
        if self.notion_officers_db_id.is_none() {
            tracing::warn!("NOTION_OFFICERS_DB_ID is not set. Officers endpoint will not work.");
        }
        if self.notion_events_db_id.is_none() {
            tracing::warn!("NOTION_EVENTS_DB_ID is not set. Events endpoints will not work.");
        }
        if self.stripe_webhook_secret.is_none() {
            tracing::warn!("STRIPE_WEBHOOK_SECRET is not set. Stripe webhooks will be rejected.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "BIND_ADDRESS",
        "PORT",
        "NOTION_TOKEN",
        "NOTION_API_URL",
        "NOTION_MEMBERS_DB_ID",
        "NOTION_OFFICERS_DB_ID",
        "NOTION_EVENTS_DB_ID",
        "STRIPE_WEBHOOK_SECRET",
        "MEMBERSHIP_UTC_OFFSET_HOURS",
        "ALLOWED_ORIGINS",
        "TRUST_PROXY_HEADERS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:4000");
        assert_eq!(config.notion_api_url, "https://api.notion.com");
        assert_eq!(config.notion_token, None);
        assert_eq!(config.stripe_webhook_secret, None);
        assert_eq!(config.membership_utc_offset, UtcOffset::UTC);
        assert!(!config.trust_proxy_headers);
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
    }

    #[test]
    #[serial]
    fn test_port_and_blank_values() {
        clear_env();
        std::env::set_var("PORT", "8080");
        std::env::set_var("NOTION_TOKEN", "   ");
        std::env::set_var("NOTION_MEMBERS_DB_ID", "members-db");

        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.notion_token, None);
        assert_eq!(config.notion_members_db_id.as_deref(), Some("members-db"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_bind_address_wins_over_port() {
        clear_env();
        std::env::set_var("PORT", "8080");
        std::env::set_var("BIND_ADDRESS", "127.0.0.1:9000");

        assert_eq!(Config::from_env().unwrap().bind_address, "127.0.0.1:9000");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_utc_offset() {
        clear_env();
        std::env::set_var("MEMBERSHIP_UTC_OFFSET_HOURS", "-6");
        assert_eq!(
            Config::from_env().unwrap().membership_utc_offset,
            UtcOffset::from_hms(-6, 0, 0).unwrap()
        );

        std::env::set_var("MEMBERSHIP_UTC_OFFSET_HOURS", "central");
        assert!(Config::from_env().is_err());

        std::env::set_var("MEMBERSHIP_UTC_OFFSET_HOURS", "30");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_malformed_port_fails() {
        clear_env();
        std::env::set_var("PORT", "http");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("PORT"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_allowed_origins_list() {
        clear_env();
        std::env::set_var("ALLOWED_ORIGINS", "https://ait.example.org, https://www.ait.example.org,");
        assert_eq!(
            Config::from_env().unwrap().allowed_origins,
            vec!["https://ait.example.org", "https://www.ait.example.org"]
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_trust_proxy_headers() {
        clear_env();
        std::env::set_var("TRUST_PROXY_HEADERS", "true");
        assert!(Config::from_env().unwrap().trust_proxy_headers);

        std::env::set_var("TRUST_PROXY_HEADERS", "0");
        assert!(!Config::from_env().unwrap().trust_proxy_headers);

        std::env::set_var("TRUST_PROXY_HEADERS", "sometimes");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("TRUST_PROXY_HEADERS"));
        clear_env();
    }
}
