//! Hiring tests.
//!
//! A hiring test is a private copy of a template repository, named after the
//! candidate, that the candidate can push to.

use async_trait::async_trait;
use config_manager::ConfigurationError;
use github_client::{Repository, RepositoryClient};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::errors::{ProvisionerError, ProvisionerResult};
use crate::request::{RepositoryDescriptor, RepositoryIdentity};

#[cfg(test)]
#[path = "hiring_tests.rs"]
mod tests;

/// Where template repositories are cloned from.
pub const DEFAULT_GIT_BASE_URL: &str = "https://github.com";

/// Permission granted to the candidate.
pub const CANDIDATE_PERMISSION: &str = "push";

/// Copies the history of one git repository into another.
#[async_trait]
pub trait RepositoryMirror: Send + Sync {
    /// Clones `source_url` and pushes it to `target_url`.
    ///
    /// # Arguments
    ///
    /// * `reference` - The branch to copy; the source's default branch when `None`.
    /// * `token` - Credentials for both remotes.
    async fn mirror(
        &self,
        source_url: &str,
        target_url: &str,
        reference: Option<&str>,
        token: &SecretString,
    ) -> ProvisionerResult<()>;
}

/// Name of the repository a candidate receives for a test.
pub fn candidate_repository_name(candidate: &str, test_repository: &str) -> String {
    format!("{candidate}-{test_repository}")
}

/// Sends hiring tests to candidates.
pub struct HiringTestProvisioner {
    github: Arc<dyn RepositoryClient>,
    mirror: Arc<dyn RepositoryMirror>,
    token: SecretString,
    git_base_url: String,
}

impl HiringTestProvisioner {
    /// Creates a provisioner that clones templates from GitHub.
    ///
    /// `token` must be able to read the templates and push to new repositories
    /// of the hiring organization.
    pub fn new(
        github: Arc<dyn RepositoryClient>,
        mirror: Arc<dyn RepositoryMirror>,
        token: SecretString,
    ) -> Self {
        Self {
            github,
            mirror,
            token,
            git_base_url: DEFAULT_GIT_BASE_URL.to_string(),
        }
    }

    /// Clones templates from another git host.
    pub fn with_git_base_url(mut self, git_base_url: impl Into<String>) -> Self {
        self.git_base_url = git_base_url.into();
        self
    }

    /// Creates the candidate's repository and fills it from the template.
    ///
    /// The steps run in order and the first failure stops the run. Nothing
    /// done by earlier steps is undone; in particular an existing candidate
    /// repository is an error rather than being reused.
    ///
    /// # Arguments
    ///
    /// * `organization` - The hiring organization, owner of both repositories.
    /// * `candidate` - The candidate's GitHub login.
    /// * `test_repository` - The template repository.
    /// * `reference` - Branch of the template to send, its default branch when `None`.
    #[instrument(skip(self))]
    pub async fn send(
        &self,
        organization: &str,
        candidate: &str,
        test_repository: &str,
        reference: Option<&str>,
    ) -> ProvisionerResult<Repository> {
        if candidate.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                field: "username".to_string(),
                reason: "please provide a GitHub username for the candidate".to_string(),
            }
            .into());
        }
        if test_repository.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                field: "repo".to_string(),
                reason: "please provide the test repository".to_string(),
            }
            .into());
        }

        let target = RepositoryIdentity::new(
            organization,
            &candidate_repository_name(candidate, test_repository),
        )?;
        let descriptor = RepositoryDescriptor {
            description: None,
            private: true,
            has_issues: false,
            has_wiki: false,
            has_pages: false,
            auto_init: false,
        };

        info!(repository = %target, "Creating repository");
        let repository = self
            .github
            .create_org_repository(organization, &descriptor.to_payload(target.name()))
            .await
            .map_err(|e| {
                ProvisionerError::from(e)
                    .context("could not create the GitHub repository for the candidate")
            })?;

        info!(repository = %target, candidate, "Adding the candidate as collaborator");
        self.github
            .add_collaborator(organization, target.name(), candidate, CANDIDATE_PERMISSION)
            .await
            .map_err(|e| {
                ProvisionerError::from(e).context("could not add the candidate as collaborator")
            })?;

        let source_url = format!(
            "{}/{}/{}.git",
            self.git_base_url.trim_end_matches('/'),
            organization,
            test_repository
        );
        let target_url = repository.clone_url();
        debug!(source = %source_url, target = %target_url, "Copying the test repository");
        self.mirror
            .mirror(&source_url, &target_url, reference, &self.token)
            .await
            .map_err(|e| e.context("could not copy the test repository"))?;

        info!(repository = %target, candidate, "Hiring test created");
        Ok(repository)
    }
}
