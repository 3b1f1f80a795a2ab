//! Client for a Zappr style merge-check service.
//!
//! The service gates pull request merges on an approval status check. Enabling
//! or disabling it is a two step protocol: the repository resource is fetched
//! with `autoSync=true` so that the service picks up the freshly created GitHub
//! repository, then the `approval` sub-resource is created or deleted.
//!
//! The client authenticates either with a GitHub token (`Authorization: token ..`)
//! or with a Zappr session token sent as a cookie. With a GitHub token the
//! client can additionally impersonate the Zappr GitHub App, after which every
//! call is made with the app's token.

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

pub mod errors;
pub use errors::{Error, ProblemResponse};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// The request timeout used when the configuration does not name one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ALREADY_ENABLED_DETAIL: &str = "Check approval already exists for repository";
const MISSING_STATUS_CHECKS_DETAIL: &str = "required_status_checks 404 Not Found";

/// Operations on a merge-check service.
#[async_trait]
pub trait MergeCheckClient: Send + Sync {
    /// Turns the approval check on for a GitHub repository.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyEnabled` when the check is already active.
    async fn enable(&self, repo_id: u64) -> Result<(), Error>;

    /// Turns the approval check off for a GitHub repository.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyNotEnabled` when the check is not active or the
    /// service does not know the repository.
    async fn disable(&self, repo_id: u64) -> Result<(), Error>;

    /// Fetches the service's GitHub App token and uses it for every later call.
    ///
    /// Returns the delegated token.
    async fn impersonate_app(&self) -> Result<SecretString, Error>;
}

/// How the client authenticates against the service.
#[derive(Debug)]
enum Credentials {
    GitHubToken(SecretString),
    ZapprSession(SecretString),
}

#[derive(Deserialize)]
struct AppTokenResponse {
    token: String,
}

/// Settings needed to pick and build a merge-check client at startup.
#[derive(Debug)]
pub struct MergeCheckSettings {
    /// The service root URL
    pub url: String,
    /// A Zappr session token; when present it takes precedence over the GitHub token
    pub zappr_token: Option<SecretString>,
    /// The GitHub token used when no session token is configured
    pub github_token: SecretString,
    /// Per request timeout
    pub timeout: Duration,
}

/// Builds the client matching the configured credentials.
///
/// A Zappr session token selects [`ZapprClient::with_zappr_token`], otherwise
/// the GitHub token is used through [`ZapprClient::with_github_token`].
///
/// # Errors
///
/// Returns `Error::InvalidUrl` when the URL cannot be parsed, or
/// `Error::RemoteError` when the HTTP client cannot be built.
pub fn from_settings(settings: MergeCheckSettings) -> Result<ZapprClient, Error> {
    match settings.zappr_token {
        Some(token) => {
            debug!("Using a Zappr session token for the merge-check service");
            ZapprClient::with_zappr_token(&settings.url, token, settings.timeout)
        }
        None => {
            debug!("Using the GitHub token for the merge-check service");
            ZapprClient::with_github_token(&settings.url, settings.github_token, settings.timeout)
        }
    }
}

/// HTTP client for a Zappr compatible merge-check service.
#[derive(Debug)]
pub struct ZapprClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: RwLock<Credentials>,
    unknown_repository: Regex,
}

impl ZapprClient {
    /// Creates a client that authenticates with a GitHub token.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The root URL of the service.
    /// * `token` - A GitHub token the service accepts.
    /// * `timeout` - Per request timeout.
    pub fn with_github_token(
        base_url: &str,
        token: SecretString,
        timeout: Duration,
    ) -> Result<Self, Error> {
        Self::build(base_url, Credentials::GitHubToken(token), timeout)
    }

    /// Creates a client that authenticates with a Zappr session token.
    ///
    /// The token is sent verbatim as the `Cookie` header.
    pub fn with_zappr_token(
        base_url: &str,
        token: SecretString,
        timeout: Duration,
    ) -> Result<Self, Error> {
        Self::build(base_url, Credentials::ZapprSession(token), timeout)
    }

    fn build(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self, Error> {
        let mut base_url = Url::parse(base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(base_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::RemoteError(e.to_string()))?;

        let unknown_repository = Regex::new(r"Repository \d+ not found")
            .map_err(|e| Error::RemoteError(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            credentials: RwLock::new(credentials),
            unknown_repository,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    /// Sends an authenticated request.
    ///
    /// Returns the response for success statuses; error statuses are turned
    /// into `Unauthorized`, `ServerError` (problem body) or `RemoteError`.
    async fn send(&self, method: Method, url: Url) -> Result<reqwest::Response, Error> {
        let mut request = self.http.request(method.clone(), url.clone());
        request = match &*self.credentials.read().await {
            Credentials::GitHubToken(token) => request.header(
                reqwest::header::AUTHORIZATION,
                format!("token {}", token.expose_secret()),
            ),
            Credentials::ZapprSession(token) => {
                request.header(reqwest::header::COOKIE, token.expose_secret())
            }
        };

        let response = request.send().await.map_err(|e| {
            error!(method = %method, url = %url, error = %e, "Merge-check request failed");
            Error::RemoteError(e.to_string())
        })?;

        let status = response.status();
        debug!(method = %method, url = %url, status = status.as_u16(), "Merge-check response");

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ProblemResponse>(&body) {
                Ok(problem) => Error::ServerError {
                    status: status.as_u16(),
                    detail: problem.detail,
                },
                Err(_) => Error::RemoteError(format!(
                    "status {} with an undecodable body",
                    status.as_u16()
                )),
            });
        }

        Ok(response)
    }

    /// Makes the service sync the repository from GitHub.
    async fn sync_repository(&self, repo_id: u64) -> Result<(), Error> {
        let mut url = self.endpoint(&format!("api/repos/{repo_id}"))?;
        url.query_pairs_mut().append_pair("autoSync", "true");
        self.send(Method::GET, url).await.map(drop)
    }
}

#[async_trait]
impl MergeCheckClient for ZapprClient {
    #[instrument(skip(self))]
    async fn enable(&self, repo_id: u64) -> Result<(), Error> {
        self.sync_repository(repo_id).await?;

        let url = self.endpoint(&format!("api/repos/{repo_id}/approval"))?;
        match self.send(Method::PUT, url).await {
            Ok(_) => {
                info!("Enabled merge-check approval");
                Ok(())
            }
            Err(Error::ServerError { status: 503, detail })
                if detail.contains(ALREADY_ENABLED_DETAIL) =>
            {
                debug!(detail = %detail, "Merge-check approval already enabled");
                Err(Error::AlreadyEnabled)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn disable(&self, repo_id: u64) -> Result<(), Error> {
        self.sync_repository(repo_id).await?;

        let url = self.endpoint(&format!("api/repos/{repo_id}/approval"))?;
        match self.send(Method::DELETE, url).await {
            Ok(_) => {
                info!("Disabled merge-check approval");
                Ok(())
            }
            Err(Error::ServerError { status: 503, detail })
                if detail.contains(MISSING_STATUS_CHECKS_DETAIL)
                    || self.unknown_repository.is_match(&detail) =>
            {
                debug!(detail = %detail, "Merge-check approval not enabled");
                Err(Error::AlreadyNotEnabled)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self))]
    async fn impersonate_app(&self) -> Result<SecretString, Error> {
        let url = self.endpoint("api/apptoken")?;
        let response = self.send(Method::GET, url).await?;
        let body: AppTokenResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Merge-check app token response could not be decoded");
            Error::RemoteError(e.to_string())
        })?;

        *self.credentials.write().await =
            Credentials::GitHubToken(SecretString::from(body.token.clone()));
        info!("Impersonating the merge-check GitHub App");

        Ok(SecretString::from(body.token))
    }
}
