//! Error types for the PullApprove client.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors reported by the PullApprove API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The token was rejected (`401`).
    #[error("PullApprove rejected the token")]
    Unauthorized,

    /// PullApprove answered with an unexpected status.
    #[error("PullApprove returned status {status}")]
    ServerError { status: u16 },

    /// The request could not be sent or the response could not be read.
    #[error("Request to PullApprove failed: {0}")]
    RemoteError(String),

    /// The configured base URL cannot be used to build request URLs.
    #[error("Invalid PullApprove URL: {0}")]
    InvalidUrl(String),
}
