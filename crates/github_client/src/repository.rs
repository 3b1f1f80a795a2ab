//! Repository domain types.
//!
//! This module contains types representing GitHub repositories, the payload used
//! to create them, and the paged listing returned for an organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;

/// Represents a GitHub repository.
///
/// This struct contains the information about a repository that the
/// provisioning workflows need: its numeric ID (required by the merge-check
/// service), its visibility, and the time of its last push.
///
/// # Examples
///
/// ```rust
/// use github_client::Repository;
///
/// let repo = Repository::new(42, "my-repo".to_string(), "acme/my-repo".to_string(), true);
///
/// assert_eq!(repo.id(), 42);
/// assert_eq!(repo.name(), "my-repo");
/// assert!(repo.is_private());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Repository {
    /// The numeric ID GitHub assigned to the repository
    id: u64,
    /// The name of the repository
    name: String,
    /// The full name of the repository (owner/name)
    full_name: String,
    /// Whether the repository is private
    private: bool,
    /// The HTTPS clone URL, when GitHub reported one
    clone_url: Option<Url>,
    /// The time of the most recent push
    pushed_at: Option<DateTime<Utc>>,
}

impl Repository {
    /// Creates a new Repository instance.
    ///
    /// # Arguments
    ///
    /// * `id` - The numeric repository ID
    /// * `name` - The name of the repository
    /// * `full_name` - The full name including owner (owner/repo)
    /// * `private` - Whether the repository is private
    pub fn new(id: u64, name: String, full_name: String, private: bool) -> Self {
        Self {
            id,
            name,
            full_name,
            private,
            clone_url: None,
            pushed_at: None,
        }
    }

    /// Returns a copy of this repository with the given last push time.
    pub fn with_pushed_at(mut self, pushed_at: DateTime<Utc>) -> Self {
        self.pushed_at = Some(pushed_at);
        self
    }

    /// Returns the numeric ID of the repository.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the name of the repository (without owner).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the full name of the repository (owner/name).
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Returns whether the repository is private.
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// Returns the time of the last push, if the repository was ever pushed to.
    pub fn pushed_at(&self) -> Option<DateTime<Utc>> {
        self.pushed_at
    }

    /// Returns the Git clone URL for the repository.
    ///
    /// Falls back to the conventional `https://github.com/{full_name}.git`
    /// form when GitHub did not report a clone URL.
    pub fn clone_url(&self) -> String {
        match &self.clone_url {
            Some(url) => url.to_string(),
            None => format!("https://github.com/{}.git", self.full_name),
        }
    }
}

impl From<octocrab::models::Repository> for Repository {
    fn from(value: octocrab::models::Repository) -> Self {
        Self {
            id: *value.id,
            name: value.name.clone(),
            full_name: value.full_name.unwrap_or(value.name),
            private: value.private.unwrap_or(false),
            clone_url: value.clone_url,
            pushed_at: value.pushed_at,
        }
    }
}

/// Represents the payload for creating a new repository via the REST API.
/// Use `Default::default()` and modify fields as needed.
#[derive(Serialize, Default, Debug, Clone, PartialEq)]
pub struct RepositoryCreatePayload {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>, // Defaults to false if None

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>, // Defaults to true if None

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>, // Defaults to true if None

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_pages: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_init: Option<bool>,
}

/// One page of an organization's repository listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryPage {
    /// The repositories on this page
    pub repositories: Vec<Repository>,

    /// The page to request next, or `None` when this was the last page
    pub next_page: Option<u32>,
}

/// Extracts the `page` query parameter from a pagination link.
pub(crate) fn page_number(uri: &str) -> Option<u32> {
    // Relative links are resolved against a placeholder host.
    let base = Url::parse("https://api.github.com/").ok()?;
    base.join(uri)
        .ok()?
        .query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
