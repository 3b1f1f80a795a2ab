//! Crate for interacting with the GitHub REST API.
//!
//! This crate provides a client for making authenticated requests to GitHub
//! with a personal access token, covering the repository level resources the
//! provisioning workflows manage: repositories, files, team and collaborator
//! access, labels, webhooks and branch protection.

use async_trait::async_trait;
use octocrab::{Octocrab, Result as OctocrabResult};
use serde::Serialize;
use tracing::{debug, error, info, instrument};
use url::Url;

pub mod errors;
pub use errors::Error;
use errors::{classify_octocrab_error, Unprocessable};

pub mod branch_protection;
pub use branch_protection::{BranchProtectionPayload, RequiredStatusChecks};

pub mod contents;
pub use contents::FileCreatePayload;

pub mod label;
pub use label::{Label, DEFAULT_LABELS};

pub mod models;
pub use models::{Collaborator, Release, ReleaseAsset};

pub mod repository;
pub use repository::{Repository, RepositoryCreatePayload, RepositoryPage};

pub mod webhook;
pub use webhook::WebhookPayload;

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// The page size GitHub allows at most for list endpoints.
const MAX_PAGE_SIZE: u8 = 100;

/// A client for interacting with the GitHub API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Creates a new `GitHubClient` from an already authenticated octocrab instance.
    ///
    /// # Arguments
    ///
    /// * `client` - The octocrab client, usually built with [`create_token_client`].
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Fetches the latest published release of a repository.
    ///
    /// # Arguments
    ///
    /// * `owner` - The owner of the repository.
    /// * `repo` - The name of the repository.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the repository has no published release.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn get_latest_release(&self, owner: &str, repo: &str) -> Result<Release, Error> {
        let path = api_path(&["repos", owner, repo, "releases", "latest"])?;
        let response: OctocrabResult<Release> = self.client.get(path, None::<&()>).await;
        response.map_err(|e| {
            map_error(
                "Failed to fetch the latest release",
                e,
                &format!("Latest release of {owner}/{repo}"),
                Unprocessable::MeansRejected,
            )
        })
    }

    async fn put_without_body_response<B: Serialize + ?Sized + Sync>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> OctocrabResult<()> {
        let response = self.client._put(path, body).await?;
        octocrab::map_github_error(response).await.map(drop)
    }

    async fn delete_without_body_response(&self, path: &str) -> OctocrabResult<()> {
        let response = self.client._delete(path, None::<&()>).await?;
        octocrab::map_github_error(response).await.map(drop)
    }
}

#[derive(Serialize)]
struct PermissionBody<'a> {
    permission: &'a str,
}

#[derive(Serialize)]
struct CollaboratorQuery {
    affiliation: &'static str,
    per_page: u8,
    page: u32,
}

#[async_trait]
impl RepositoryClient for GitHubClient {
    #[instrument(skip(self, payload), fields(org = %org_name, repo = %payload.name))]
    async fn create_org_repository(
        &self,
        org_name: &str,
        payload: &RepositoryCreatePayload,
    ) -> Result<Repository, Error> {
        let path = api_path(&["orgs", org_name, "repos"])?;
        let response: OctocrabResult<octocrab::models::Repository> =
            self.client.post(path, Some(payload)).await;
        match response {
            Ok(r) => {
                info!(repo_id = *r.id, "Created repository");
                Ok(Repository::from(r))
            }
            Err(e) => Err(map_error(
                "Failed to create repository for organisation",
                e,
                &format!("Repository {}/{}", org_name, payload.name),
                Unprocessable::MeansAlreadyExists,
            )),
        }
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository, Error> {
        match self.client.repos(owner, repo).get().await {
            Ok(r) => Ok(Repository::from(r)),
            Err(e) => Err(map_error(
                "Failed to get repository",
                e,
                &format!("Repository {owner}/{repo}"),
                Unprocessable::MeansRejected,
            )),
        }
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn delete_repository(&self, owner: &str, repo: &str) -> Result<(), Error> {
        self.client
            .repos(owner, repo)
            .delete()
            .await
            .map_err(|e| {
                map_error(
                    "Failed to delete repository",
                    e,
                    &format!("Repository {owner}/{repo}"),
                    Unprocessable::MeansRejected,
                )
            })?;

        info!("Deleted repository");
        Ok(())
    }

    #[instrument(skip(self, content), fields(owner = %owner, repo = %repo, path = %file_path))]
    async fn create_file(
        &self,
        owner: &str,
        repo: &str,
        file_path: &str,
        content: &FileCreatePayload,
    ) -> Result<(), Error> {
        let mut segments = vec!["repos", owner, repo, "contents"];
        segments.extend(file_path.split('/').filter(|s| !s.is_empty()));
        let path = api_path(&segments)?;

        let response: OctocrabResult<serde_json::Value> =
            self.client.put(path, Some(content)).await;
        response.map(drop).map_err(|e| {
            map_error(
                "Failed to create file",
                e,
                &format!("File '{file_path}' in {owner}/{repo}"),
                Unprocessable::MeansAlreadyExists,
            )
        })
    }

    #[instrument(skip(self), fields(org = %org, repo = %repo, team_id = team_id))]
    async fn add_team_to_repository(
        &self,
        team_id: u64,
        org: &str,
        repo: &str,
        permission: &str,
    ) -> Result<(), Error> {
        let team = team_id.to_string();
        let path = api_path(&["teams", &team, "repos", org, repo])?;

        self.put_without_body_response(&path, Some(&PermissionBody { permission }))
            .await
            .map_err(|e| {
                map_error(
                    "Failed to grant team access",
                    e,
                    &format!("Team {team_id}"),
                    Unprocessable::MeansRejected,
                )
            })
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo, user = %username))]
    async fn add_collaborator(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
        permission: &str,
    ) -> Result<(), Error> {
        let path = api_path(&["repos", owner, repo, "collaborators", username])?;

        self.put_without_body_response(&path, Some(&PermissionBody { permission }))
            .await
            .map_err(|e| {
                map_error(
                    "Failed to add collaborator",
                    e,
                    &format!("Collaborator '{username}'"),
                    Unprocessable::MeansRejected,
                )
            })
    }

    #[instrument(skip(self, label), fields(owner = %owner, repo = %repo, label = %label.name))]
    async fn create_label(&self, owner: &str, repo: &str, label: &Label) -> Result<(), Error> {
        let path = api_path(&["repos", owner, repo, "labels"])?;

        let response: OctocrabResult<Label> = self.client.post(path, Some(label)).await;
        response.map(drop).map_err(|e| {
            map_error(
                "Failed to create label",
                e,
                &format!("Label '{}'", label.name),
                Unprocessable::MeansAlreadyExists,
            )
        })
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo, label = %name))]
    async fn delete_label(&self, owner: &str, repo: &str, name: &str) -> Result<(), Error> {
        let path = api_path(&["repos", owner, repo, "labels", name])?;

        self.delete_without_body_response(&path).await.map_err(|e| {
            map_error(
                "Failed to delete label",
                e,
                &format!("Label '{name}'"),
                Unprocessable::MeansRejected,
            )
        })
    }

    #[instrument(skip(self, hook), fields(owner = %owner, repo = %repo, hook = %hook.name))]
    async fn create_webhook(
        &self,
        owner: &str,
        repo: &str,
        hook: &WebhookPayload,
    ) -> Result<(), Error> {
        let path = api_path(&["repos", owner, repo, "hooks"])?;

        let response: OctocrabResult<serde_json::Value> = self.client.post(path, Some(hook)).await;
        response.map(drop).map_err(|e| {
            map_error(
                "Failed to create webhook",
                e,
                &format!("Webhook '{}'", hook.name),
                Unprocessable::MeansAlreadyExists,
            )
        })
    }

    #[instrument(skip(self, protection), fields(owner = %owner, repo = %repo, branch = %branch))]
    async fn update_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        protection: &BranchProtectionPayload,
    ) -> Result<(), Error> {
        let path = api_path(&["repos", owner, repo, "branches", branch, "protection"])?;

        let response: OctocrabResult<serde_json::Value> =
            self.client.put(path, Some(protection)).await;
        response.map(drop).map_err(|e| {
            map_error(
                "Failed to update branch protection",
                e,
                &format!("Branch '{branch}'"),
                Unprocessable::MeansRejected,
            )
        })
    }

    #[instrument(skip(self), fields(org = %org))]
    async fn list_org_repositories(
        &self,
        org: &str,
        page: u32,
        per_page: u8,
    ) -> Result<RepositoryPage, Error> {
        let result = self
            .client
            .orgs(org)
            .list_repos()
            .per_page(per_page)
            .page(page)
            .send()
            .await;

        match result {
            Ok(p) => {
                let next_page = p
                    .next
                    .as_ref()
                    .and_then(|uri| repository::page_number(&uri.to_string()));
                let repositories: Vec<Repository> =
                    p.items.into_iter().map(Repository::from).collect();

                debug!(
                    page = page,
                    count = repositories.len(),
                    next_page = ?next_page,
                    "Listed organization repositories"
                );
                Ok(RepositoryPage {
                    repositories,
                    next_page,
                })
            }
            Err(e) => Err(map_error(
                "Failed to list organization repositories",
                e,
                &format!("Organization {org}"),
                Unprocessable::MeansRejected,
            )),
        }
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn list_outside_collaborators(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Collaborator>, Error> {
        let path = api_path(&["repos", owner, repo, "collaborators"])?;
        let mut collaborators = Vec::new();
        let mut page = 1;

        loop {
            let query = CollaboratorQuery {
                affiliation: "outside",
                per_page: MAX_PAGE_SIZE,
                page,
            };
            let response: OctocrabResult<Vec<Collaborator>> =
                self.client.get(&path, Some(&query)).await;
            let batch = response.map_err(|e| {
                map_error(
                    "Failed to list outside collaborators",
                    e,
                    &format!("Repository {owner}/{repo}"),
                    Unprocessable::MeansRejected,
                )
            })?;

            let done = batch.len() < usize::from(MAX_PAGE_SIZE);
            collaborators.extend(batch);
            if done {
                break;
            }
            page += 1;
        }

        debug!(count = collaborators.len(), "Listed outside collaborators");
        Ok(collaborators)
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo, user = %username))]
    async fn remove_collaborator(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> Result<(), Error> {
        let path = api_path(&["repos", owner, repo, "collaborators", username])?;

        self.delete_without_body_response(&path).await.map_err(|e| {
            map_error(
                "Failed to remove collaborator",
                e,
                &format!("Collaborator '{username}'"),
                Unprocessable::MeansRejected,
            )
        })
    }
}

/// The repository level GitHub operations the provisioning workflows rely on.
///
/// Implementations must translate every failure into the closed [`Error`] set
/// so that callers can decide structurally which failures to tolerate.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Creates a new repository within the given organization.
    ///
    /// # Errors
    ///
    /// * `Error::AlreadyExists` when a repository with that name is present.
    /// * `Error::QuotaExceeded` when the organization cannot hold another private repository.
    async fn create_org_repository(
        &self,
        org_name: &str,
        payload: &RepositoryCreatePayload,
    ) -> Result<Repository, Error>;

    /// Fetches a repository.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the repository is absent or invisible to the token.
    async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository, Error>;

    /// Deletes a repository.
    async fn delete_repository(&self, owner: &str, repo: &str) -> Result<(), Error>;

    /// Creates a file on the branch named in `content`.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyExists` when the file is already present.
    async fn create_file(
        &self,
        owner: &str,
        repo: &str,
        file_path: &str,
        content: &FileCreatePayload,
    ) -> Result<(), Error>;

    /// Grants a team the given permission on a repository.
    async fn add_team_to_repository(
        &self,
        team_id: u64,
        org: &str,
        repo: &str,
        permission: &str,
    ) -> Result<(), Error>;

    /// Adds or invites a user as a collaborator with the given permission.
    async fn add_collaborator(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
        permission: &str,
    ) -> Result<(), Error>;

    /// Creates a label.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyExists` when a label with that name is present.
    async fn create_label(&self, owner: &str, repo: &str, label: &Label) -> Result<(), Error>;

    /// Deletes a label by name.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when no label with that name exists.
    async fn delete_label(&self, owner: &str, repo: &str, name: &str) -> Result<(), Error>;

    /// Creates a webhook.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyExists` when an identical hook is already configured.
    async fn create_webhook(
        &self,
        owner: &str,
        repo: &str,
        hook: &WebhookPayload,
    ) -> Result<(), Error>;

    /// Replaces the protection settings of a branch.
    async fn update_branch_protection(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        protection: &BranchProtectionPayload,
    ) -> Result<(), Error>;

    /// Lists one page of an organization's repositories.
    ///
    /// The returned page carries the number of the next page, or `None` on the last one.
    async fn list_org_repositories(
        &self,
        org: &str,
        page: u32,
        per_page: u8,
    ) -> Result<RepositoryPage, Error>;

    /// Lists every outside collaborator of a repository, following pagination.
    async fn list_outside_collaborators(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Collaborator>, Error>;

    /// Removes a collaborator from a repository.
    async fn remove_collaborator(
        &self,
        owner: &str,
        repo: &str,
        username: &str,
    ) -> Result<(), Error>;
}

/// Creates an octocrab client authenticated with a personal access token.
///
/// # Arguments
///
/// * `token` - The GitHub personal access token.
///
/// # Errors
///
/// Returns `Error::AuthError` if the client cannot be built.
///
/// # Example
///
/// ```rust,no_run
/// use github_client::{create_token_client, GitHubClient};
///
/// # fn example() -> Result<(), github_client::Error> {
/// let octocrab = create_token_client("ghp_example")?;
/// let client = GitHubClient::new(octocrab);
/// # Ok(())
/// # }
/// ```
#[instrument(skip(token))]
pub fn create_token_client(token: &str) -> Result<Octocrab, Error> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(|e| {
            error!(error = ?e, "Failed to build Octocrab client with a personal token");
            Error::AuthError(e.to_string())
        })
}

/// Builds an API path from raw segments, percent-encoding each one.
///
/// Label names and file paths may contain spaces or other reserved characters.
pub(crate) fn api_path(segments: &[&str]) -> Result<String, Error> {
    let mut url = Url::parse("https://api.github.com/")
        .map_err(|e| Error::InvalidRequest(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| Error::InvalidRequest("Cannot build an API path".to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

/// Classifies an octocrab failure and logs it.
///
/// Expected outcomes of idempotent calls (already exists, not found) are
/// logged at debug level; everything else is an error.
fn map_error(
    message: &str,
    e: octocrab::Error,
    resource: &str,
    unprocessable: Unprocessable,
) -> Error {
    let classified = classify_octocrab_error(e, resource, unprocessable);
    match &classified {
        Error::AlreadyExists(_) | Error::NotFound(_) => {
            debug!(error_message = %classified, "{}", message)
        }
        _ => error!(error_message = %classified, "{}. Received an error from GitHub", message),
    }
    classified
}
