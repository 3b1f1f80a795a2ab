//! Removal of outside collaborators from recently active repositories.

use chrono::{DateTime, Utc};
use github_client::{Repository, RepositoryClient};
use tracing::{debug, info, instrument};

use crate::errors::{ProvisionerError, ProvisionerResult};

#[cfg(test)]
#[path = "sweeper_tests.rs"]
mod tests;

const SECONDS_PER_WEEK: f64 = 604_800.0;

/// The largest page GitHub serves.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Parameters of a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepOptions {
    pub page_size: u8,
    /// First page of the repository listing to fetch
    pub start_page: u32,
    /// Repositories last pushed this many weeks ago or earlier are skipped
    pub inactivity_weeks: u32,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            page_size: 50,
            start_page: 1,
            inactivity_weeks: 5,
        }
    }
}

/// What a sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub repositories_fetched: usize,
    pub repositories_skipped: usize,
    pub collaborators_removed: usize,
}

/// Whole weeks between `pushed_at` and `now`, halves rounded away from zero.
pub fn weeks_since(pushed_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (now - pushed_at).num_milliseconds() as f64 / 1000.0;
    // f64::round rounds half away from zero.
    (seconds / SECONDS_PER_WEEK).round() as i64
}

/// Whether a repository was pushed to less than `threshold_weeks` ago.
///
/// A repository that was never pushed to is inactive.
pub fn is_active(repository: &Repository, threshold_weeks: u32, now: DateTime<Utc>) -> bool {
    repository
        .pushed_at()
        .is_some_and(|pushed_at| weeks_since(pushed_at, now) < i64::from(threshold_weeks))
}

/// Removes every outside collaborator from the active repositories of
/// `organization`.
///
/// All pages of the repository listing are fetched first. The sweep stops at
/// the first failure.
#[instrument(skip(github, now))]
pub async fn sweep(
    github: &dyn RepositoryClient,
    organization: &str,
    options: &SweepOptions,
    now: DateTime<Utc>,
) -> ProvisionerResult<SweepSummary> {
    info!("Fetching repositories");
    let repositories = fetch_all_repositories(github, organization, options).await?;
    info!(count = repositories.len(), "Repositories fetched");

    let mut summary = SweepSummary {
        repositories_fetched: repositories.len(),
        ..SweepSummary::default()
    };

    info!("Removing outside collaborators");
    for repository in &repositories {
        if !is_active(repository, options.inactivity_weeks, now) {
            debug!(repo = repository.name(), "Inactive, skipping");
            summary.repositories_skipped += 1;
            continue;
        }

        debug!(repo = repository.name(), "Fetching outside collaborators");
        let collaborators = github
            .list_outside_collaborators(organization, repository.name())
            .await
            .map_err(|e| {
                ProvisionerError::from(e).context("could not retrieve outside collaborators")
            })?;

        for collaborator in collaborators {
            info!(repo = repository.name(), collaborator = %collaborator.login, "Removing outside collaborator");
            github
                .remove_collaborator(organization, repository.name(), &collaborator.login)
                .await
                .map_err(|e| {
                    ProvisionerError::from(e).context("could not unseat outside collaborator")
                })?;
            summary.collaborators_removed += 1;
        }
    }

    info!(
        removed = summary.collaborators_removed,
        skipped = summary.repositories_skipped,
        "Outside collaborators unseated"
    );
    Ok(summary)
}

async fn fetch_all_repositories(
    github: &dyn RepositoryClient,
    organization: &str,
    options: &SweepOptions,
) -> ProvisionerResult<Vec<Repository>> {
    let per_page = options.page_size.clamp(1, MAX_PAGE_SIZE);
    let mut page = options.start_page.max(1);
    let mut repositories = Vec::new();

    loop {
        debug!(page, "Fetching repositories page");
        let listing = github
            .list_org_repositories(organization, page, per_page)
            .await
            .map_err(|e| ProvisionerError::from(e).context("could not retrieve repositories"))?;
        repositories.extend(listing.repositories);

        match listing.next_page {
            Some(next) if next > page => page = next,
            _ => break,
        }
    }

    Ok(repositories)
}
