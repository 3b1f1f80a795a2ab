//! Client for the PullApprove approval-policy service.
//!
//! PullApprove enforces required-reviewer policies on pull requests. A
//! repository takes part once it carries the policy marker file and has been
//! registered with the service through [`ApprovalPolicyClient::register`].

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use url::Url;

pub mod errors;
pub use errors::Error;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// The public PullApprove API.
pub const DEFAULT_BASE_URL: &str = "https://pullapprove.com/api/";

/// Registers repositories with an approval-policy service.
#[async_trait]
pub trait ApprovalPolicyClient: Send + Sync {
    /// Registers the repository `name` of organization `org`.
    ///
    /// # Errors
    ///
    /// * `Error::Unauthorized` when the service rejects the token.
    /// * `Error::ServerError` for any other non-success status.
    async fn register(&self, name: &str, org: &str) -> Result<(), Error>;
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
}

/// HTTP client for the PullApprove API.
#[derive(Debug)]
pub struct PullApproveClient {
    http: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl PullApproveClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The API root, e.g. [`DEFAULT_BASE_URL`].
    /// * `token` - The PullApprove API token.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` when `base_url` is not an absolute URL.
    pub fn new(base_url: &str, token: SecretString) -> Result<Self, Error> {
        let base_url = Url::parse(base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        })
    }

    fn repos_url(&self, org: &str) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["orgs", org, "repos", ""]);
        Ok(url)
    }
}

#[async_trait]
impl ApprovalPolicyClient for PullApproveClient {
    #[instrument(skip(self), fields(org = %org, repo = %name))]
    async fn register(&self, name: &str, org: &str) -> Result<(), Error> {
        let url = self.repos_url(org)?;
        debug!(url = %url, "Registering repository with PullApprove");

        let response = self
            .http
            .post(url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Token {}", self.token.expose_secret()),
            )
            .json(&RegisterRequest { name })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to reach PullApprove");
                Error::RemoteError(e.to_string())
            })?;

        match response.status() {
            StatusCode::CREATED => {
                info!("Registered repository with PullApprove");
                Ok(())
            }
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            status => {
                error!(status = status.as_u16(), "PullApprove rejected the registration");
                Err(Error::ServerError {
                    status: status.as_u16(),
                })
            }
        }
    }
}
