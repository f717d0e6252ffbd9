//! Application state

use std::sync::Arc;

use ait_membership::{
    MemberStore, MembershipService, NotionMemberStore, SignupService, WebhookHandler,
};
use ait_shared::{NotionClient, RateLimiter};

use crate::{config::Config, content::ContentRepository};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Stripe webhook verification and checkout reconciliation
    pub webhooks: Arc<WebhookHandler>,
    /// Direct signups from the join form
    pub signup: SignupService,
    /// Officers and events
    pub content: ContentRepository,
    /// Throttles the signup form per client IP
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Build the state against Notion as configured
    pub fn new(config: Config) -> Self {
        let notion = config.notion_token.as_ref().map(|token| {
            tracing::info!(base_url = %config.notion_api_url, "Notion client initialized");
            NotionClient::with_base_url(token.clone(), config.notion_api_url.clone())
        });

        let store: Arc<dyn MemberStore> = Arc::new(NotionMemberStore::new(
            notion.clone(),
            config.notion_members_db_id.clone(),
        ));
        let content = ContentRepository::new(
            notion,
            config.notion_officers_db_id.clone(),
            config.notion_events_db_id.clone(),
        );

        Self::with_store(config, store, content)
    }

    /// Build the state around an explicit member store and content source
    pub fn with_store(
        config: Config,
        store: Arc<dyn MemberStore>,
        content: ContentRepository,
    ) -> Self {
        let offset = config.membership_utc_offset;

        let membership = MembershipService::new(store.clone(), offset);
        let webhooks = Arc::new(WebhookHandler::new(
            membership,
            config.stripe_webhook_secret.clone(),
        ));
        if webhooks.is_configured() {
            tracing::info!("Stripe webhook verification enabled");
        } else {
            tracing::warn!("Stripe webhooks not configured (missing STRIPE_WEBHOOK_SECRET)");
        }

        let signup = SignupService::new(store, offset);

        let rate_limiter = RateLimiter::new_in_memory();
        tracing::info!("Rate limiter initialized");

        Self {
            config,
            webhooks,
            signup,
            content,
            rate_limiter,
        }
    }
}
