//! Repository contents domain types.
//!
//! This module contains the payload used to create a single file in a
//! repository through the GitHub Contents API.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "contents_tests.rs"]
mod tests;

/// Payload for `PUT /repos/{owner}/{repo}/contents/{path}`.
///
/// GitHub expects the file content base64 encoded; use [`FileCreatePayload::new`]
/// to encode it from plain text.
///
/// # Examples
///
/// ```rust
/// use github_client::FileCreatePayload;
///
/// let payload = FileCreatePayload::new("Add marker", "extends: acme\n", "master");
/// assert_eq!(payload.content, "ZXh0ZW5kczogYWNtZQo=");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCreatePayload {
    /// The commit message
    pub message: String,

    /// The base64 encoded file content
    pub content: String,

    /// The branch to commit to
    pub branch: String,
}

impl FileCreatePayload {
    /// Creates a payload, encoding `content` as base64.
    pub fn new(message: &str, content: &str, branch: &str) -> Self {
        Self {
            message: message.to_string(),
            content: STANDARD.encode(content.as_bytes()),
            branch: branch.to_string(),
        }
    }

    /// Decodes the content back into text.
    ///
    /// Returns `None` when the content is not valid base64 or not UTF-8.
    pub fn decoded_content(&self) -> Option<String> {
        let bytes = STANDARD.decode(&self.content).ok()?;
        String::from_utf8(bytes).ok()
    }
}
