//! Error types for the merge-check client.

use serde::Deserialize;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors reported by the merge-check service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The credentials were rejected (`401`).
    #[error("You do not have permissions to use the merge-check API")]
    Unauthorized,

    /// The approval check is already active on the repository.
    #[error("Merge-check is already enabled for the repository")]
    AlreadyEnabled,

    /// The approval check is not active, or the repository is unknown to the service.
    #[error("Merge-check is not enabled for the repository")]
    AlreadyNotEnabled,

    /// The service answered with an error status and a decodable problem body.
    #[error("Merge-check service returned status {status}: {detail}")]
    ServerError { status: u16, detail: String },

    /// A transport failure or an error response without a decodable body.
    #[error("Request to the merge-check service failed: {0}")]
    RemoteError(String),

    /// The configured base URL cannot be used.
    #[error("Invalid merge-check URL: {0}")]
    InvalidUrl(String),
}

/// The problem document the service sends with error responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProblemResponse {
    #[serde(rename = "type", default)]
    pub problem_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub status: Option<u16>,
}
