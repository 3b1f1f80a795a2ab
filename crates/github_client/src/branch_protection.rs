//! Branch protection payloads.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "branch_protection_tests.rs"]
mod tests;

/// Payload for `PUT /repos/{owner}/{repo}/branches/{branch}/protection`.
///
/// GitHub requires all four top-level keys to be present, so the sections
/// this tool does not manage are sent as explicit `null`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchProtectionPayload {
    pub required_status_checks: RequiredStatusChecks,
    pub enforce_admins: bool,
    pub required_pull_request_reviews: Option<serde_json::Value>,
    pub restrictions: Option<serde_json::Value>,
}

/// The status checks that must pass before merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredStatusChecks {
    /// Require branches to be up to date before merging
    pub strict: bool,

    /// The status check contexts that must pass
    pub contexts: Vec<String>,
}

impl BranchProtectionPayload {
    /// Builds a payload that only requires the given status check contexts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use github_client::BranchProtectionPayload;
    ///
    /// let payload = BranchProtectionPayload::with_contexts(vec!["ci/build".to_string()]);
    /// assert_eq!(payload.required_status_checks.contexts, vec!["ci/build"]);
    /// ```
    pub fn with_contexts(contexts: Vec<String>) -> Self {
        Self {
            required_status_checks: RequiredStatusChecks {
                strict: false,
                contexts,
            },
            enforce_admins: false,
            required_pull_request_reviews: None,
            restrictions: None,
        }
    }
}
