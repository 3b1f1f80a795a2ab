//! Label domain types.
//!
//! This module contains types representing GitHub issue and pull request labels.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "label_tests.rs"]
mod tests;

/// The labels GitHub adds to every new repository.
pub const DEFAULT_LABELS: [&str; 8] = [
    "bug",
    "duplicate",
    "enhancement",
    "help wanted",
    "invalid",
    "question",
    "wontfix",
    "good first issue",
];

/// Represents a label to create on a repository.
///
/// # Examples
///
/// ```
/// use github_client::Label;
///
/// let label = Label {
///     name: "needs-review".to_string(),
///     color: "fbca04".to_string(),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// The name of the label
    pub name: String,

    /// The label color as a hex code without the leading `#`
    pub color: String,
}
