//! GitHub webhook types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

/// Payload for creating a repository webhook.
///
/// `name` is the hook type; GitHub accepts `web` for regular webhooks.
/// `config` is passed through unchanged (`url`, `content_type`, `secret`, ...).
///
/// # Examples
///
/// ```rust
/// use github_client::WebhookPayload;
/// use std::collections::BTreeMap;
///
/// let mut config = BTreeMap::new();
/// config.insert("url".to_string(), serde_json::json!("https://ci.example.com/hook"));
///
/// let hook = WebhookPayload::new("web", config);
/// assert!(hook.active);
/// assert!(hook.events.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    /// The hook type
    pub name: String,

    /// Hook configuration passed to GitHub as-is
    pub config: BTreeMap<String, serde_json::Value>,

    /// Events that trigger the webhook; GitHub defaults to `push` when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,

    /// Whether the webhook is active
    pub active: bool,
}

impl WebhookPayload {
    /// Creates an active webhook payload that listens to GitHub's default events.
    pub fn new(name: impl Into<String>, config: BTreeMap<String, serde_json::Value>) -> Self {
        Self {
            name: name.into(),
            config,
            events: None,
            active: true,
        }
    }
}
