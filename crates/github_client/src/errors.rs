//! Error types for GitHub client operations.
//!
//! This module defines the closed set of failures that the github_client crate
//! reports. Transport and API level failures from octocrab are translated into
//! these variants so that callers can match on them structurally instead of
//! inspecting error messages.

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur during GitHub client operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use github_client::Error;
///
/// match github_client.create_org_repository("acme", &payload).await {
///     Ok(repo) => println!("Repository created: {}", repo.name()),
///     Err(Error::AlreadyExists(what)) => println!("{what} already exists"),
///     Err(Error::QuotaExceeded(msg)) => eprintln!("Private repository limit reached: {msg}"),
///     Err(err) => eprintln!("Other error: {err}"),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The resource the request tried to create is already present.
    ///
    /// GitHub reports this as a `422 Unprocessable Entity` on repository,
    /// file, label and webhook creation.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The organization cannot hold another private repository.
    #[error("Limit for private repositories on this account is exceeded: {0}")]
    QuotaExceeded(String),

    /// The credentials were rejected (`401`).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The requested resource was not found (`404`).
    ///
    /// GitHub also answers `404` when the token cannot see a private resource,
    /// so this does not prove that the resource is absent.
    #[error("{0} was not found")]
    NotFound(String),

    /// GitHub returned an unexpected status code with a decodable error body.
    #[error("GitHub returned status {status}: {message}")]
    ServerError { status: u16, message: String },

    /// A transport-level failure or a response that could not be decoded.
    #[error("Request to GitHub failed: {0}")]
    RemoteError(String),

    /// Authentication or GitHub client initialization failure.
    #[error("Failed to authenticate or initialize GitHub client: {0}")]
    AuthError(String),

    /// The request could not be built from the supplied arguments.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error deserializing the response from GitHub.
    #[error("Failed to deserialize GitHub response: {0}")]
    Deserialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns the HTTP status code GitHub answered with, when one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::AlreadyExists(_) => Some(422),
            Error::Unauthorized(_) => Some(401),
            Error::NotFound(_) => Some(404),
            Error::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Describes what a `422 Unprocessable Entity` answer means for a given call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unprocessable {
    /// The resource being created is already there.
    MeansAlreadyExists,
    /// The payload was rejected; report it as a server error.
    MeansRejected,
}

/// Messages GitHub uses when an organization has run out of private repositories.
const QUOTA_MESSAGES: [&str; 2] = [
    "Visibility can't be private",
    "exceeded the number of private repositories",
];

/// Translates an octocrab failure into the crate's closed error set.
pub(crate) fn classify_octocrab_error(
    e: octocrab::Error,
    resource: &str,
    unprocessable: Unprocessable,
) -> Error {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            let details = source
                .errors
                .as_ref()
                .map(|errors| {
                    errors
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join("; ")
                })
                .unwrap_or_default();
            let message = if details.is_empty() {
                source.message.clone()
            } else {
                format!("{} ({})", source.message, details)
            };

            if QUOTA_MESSAGES.iter().any(|m| message.contains(m)) {
                return Error::QuotaExceeded(message);
            }

            match status {
                401 => Error::Unauthorized(message),
                404 => Error::NotFound(resource.to_string()),
                422 if unprocessable == Unprocessable::MeansAlreadyExists => {
                    Error::AlreadyExists(resource.to_string())
                }
                _ => Error::ServerError { status, message },
            }
        }
        octocrab::Error::Json { source, .. } => Error::RemoteError(format!(
            "Could not decode the response for {}: {}",
            resource, source
        )),
        other => Error::RemoteError(other.to_string()),
    }
}
