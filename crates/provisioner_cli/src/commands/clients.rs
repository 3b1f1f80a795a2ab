//! Builds the remote clients a command needs from the configuration.

use std::{sync::Arc, time::Duration};

use config_manager::{AppConfig, ConfigurationError};
use github_client::{create_token_client, GitHubClient};
use merge_check_client::{from_settings, MergeCheckSettings, ZapprClient};
use provisioner_core::{ProvisionContext, RuleName, RuleSet};
use pullapprove_client::PullApproveClient;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::errors::Error;

#[cfg(test)]
#[path = "clients_tests.rs"]
mod tests;

/// Creates a GitHub client authenticated with `token`.
pub fn github(token: &SecretString) -> Result<GitHubClient, Error> {
    let octocrab = create_token_client(token.expose_secret()).map_err(Error::GitHubClient)?;
    Ok(GitHubClient::new(octocrab))
}

/// Creates the merge-check client, or `None` when no service URL is configured.
///
/// A Zappr session token takes precedence over the GitHub token.
pub fn merge_check(config: &AppConfig) -> Result<Option<ZapprClient>, Error> {
    if !config.merge_check.is_configured() {
        return Ok(None);
    }
    config.merge_check.validate()?;
    let github_token = config.github.require_token()?.clone();

    let client = from_settings(MergeCheckSettings {
        url: config.merge_check.url.clone(),
        zappr_token: config.merge_check.token.clone(),
        github_token,
        timeout: Duration::from_secs(config.merge_check.timeout_seconds),
    })
    .map_err(Error::MergeCheckClient)?;
    Ok(Some(client))
}

/// Creates the PullApprove client, or `None` when no token is configured.
pub fn pull_approve(config: &AppConfig) -> Result<Option<PullApproveClient>, Error> {
    let Some(token) = config.pullapprove.token.clone() else {
        return Ok(None);
    };
    let client =
        PullApproveClient::new(&config.pullapprove.url, token).map_err(Error::PullApproveClient)?;
    Ok(Some(client))
}

/// Builds the context for a provisioning run.
///
/// Services used by an enabled rule are validated first, so a missing token
/// or URL is reported before anything is created.
pub fn provision_context(config: &AppConfig, rules: &RuleSet) -> Result<ProvisionContext, Error> {
    config.github.validate()?;
    if rules.is_enabled(RuleName::PullApprove) {
        config.pullapprove.validate()?;
    }
    if rules.is_enabled(RuleName::MergeCheck) && !config.merge_check.is_configured() {
        return Err(ConfigurationError::RequiredConfigMissing {
            key: "merge_check.url".to_string(),
        }
        .into());
    }

    let mut ctx = ProvisionContext::new(Arc::new(github(config.github.require_token()?)?));
    if let Some(client) = pull_approve(config)? {
        debug!("PullApprove client configured");
        ctx = ctx.with_approval_policy(Arc::new(client));
    }
    if let Some(client) = merge_check(config)? {
        debug!(url = %config.merge_check.url, "Merge-check client configured");
        ctx = ctx.with_merge_check(Arc::new(client));
    }
    Ok(ctx)
}

/// Builds the context for deleting a repository.
pub fn decommission_context(config: &AppConfig) -> Result<ProvisionContext, Error> {
    config.github.validate()?;

    let mut ctx = ProvisionContext::new(Arc::new(github(config.github.require_token()?)?));
    if let Some(client) = merge_check(config)? {
        ctx = ctx.with_merge_check(Arc::new(client));
    }
    Ok(ctx)
}
