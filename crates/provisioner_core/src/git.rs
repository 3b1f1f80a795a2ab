//! Local git operations.
//!
//! [`GitMirror`] copies a repository by cloning it into a temporary working
//! directory and pushing the checked out branch to another remote. All git2
//! calls block, so they run on the blocking thread pool.

use async_trait::async_trait;
use git2::build::RepoBuilder;
use git2::{Cred, CredentialType, FetchOptions, PushOptions, RemoteCallbacks, Repository};
use secrecy::{ExposeSecret, SecretString};
use temp_dir::TempDir;
use tracing::{debug, error, info};

use crate::errors::{ProvisionerError, ProvisionerResult};
use crate::hiring::RepositoryMirror;

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;

const REMOTE_NAME: &str = "origin";

/// Mirrors repositories with libgit2.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitMirror;

impl GitMirror {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RepositoryMirror for GitMirror {
    async fn mirror(
        &self,
        source_url: &str,
        target_url: &str,
        reference: Option<&str>,
        token: &SecretString,
    ) -> ProvisionerResult<()> {
        let source_url = source_url.to_string();
        let target_url = target_url.to_string();
        let reference = reference.map(str::to_string);
        let token = SecretString::from(token.expose_secret().to_string());

        tokio::task::spawn_blocking(move || {
            mirror_blocking(&source_url, &target_url, reference.as_deref(), &token)
        })
        .await
        .map_err(|e| ProvisionerError::Git(format!("git task did not complete: {e}")))?
    }
}

/// Answers credential requests with the token as an `x-access-token` password.
fn authenticated_callbacks(token: &str) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |url, _username, allowed_types| {
        debug!(url, "Git credentials requested");
        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            Cred::userpass_plaintext("x-access-token", token)
        } else {
            Cred::default()
        }
    });
    callbacks
}

fn git_error(action: &'static str) -> impl Fn(git2::Error) -> ProvisionerError {
    move |e| {
        error!(error = %e, "Failed to {action}");
        ProvisionerError::Git(format!("failed to {action}: {}", e.message()))
    }
}

fn mirror_blocking(
    source_url: &str,
    target_url: &str,
    reference: Option<&str>,
    token: &SecretString,
) -> ProvisionerResult<()> {
    let workdir = TempDir::new()
        .map_err(|e| ProvisionerError::Git(format!("failed to create a working directory: {e}")))?;

    info!(source = source_url, "Cloning repository");
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(authenticated_callbacks(token.expose_secret()));
    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    if let Some(branch) = reference {
        builder.branch(branch);
    }
    let repo = builder
        .clone(source_url, workdir.path())
        .map_err(git_error("clone the repository"))?;

    let branch = match reference {
        Some(branch) => branch.to_string(),
        None => current_branch(&repo)?,
    };
    debug!(branch = %branch, "Repository cloned");

    info!(target = target_url, "Changing remote");
    repo.remote_set_url(REMOTE_NAME, target_url)
        .map_err(git_error("change the remote"))?;
    let mut remote = repo
        .find_remote(REMOTE_NAME)
        .map_err(git_error("find the remote"))?;

    info!(branch = %branch, "Pushing changes");
    let mut callbacks = authenticated_callbacks(token.expose_secret());
    callbacks.push_update_reference(|refname, status| match status {
        Some(message) => Err(git2::Error::from_str(&format!(
            "{refname} was rejected: {message}"
        ))),
        None => Ok(()),
    });
    let mut push_options = PushOptions::new();
    push_options.remote_callbacks(callbacks);
    let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
    remote
        .push(&[refspec.as_str()], Some(&mut push_options))
        .map_err(git_error("push to the repository"))?;

    Ok(())
}

fn current_branch(repo: &Repository) -> ProvisionerResult<String> {
    let head = repo.head().map_err(git_error("read HEAD"))?;
    head.shorthand()
        .map(str::to_string)
        .ok_or_else(|| ProvisionerError::Git("HEAD does not name a branch".to_string()))
}
