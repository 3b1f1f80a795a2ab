//! Repository decommissioning.

use tracing::{debug, info, instrument, warn};

use crate::context::ProvisionContext;
use crate::errors::{ErrorKind, ProvisionerError, ProvisionerResult};
use crate::request::RepositoryIdentity;

#[cfg(test)]
#[path = "decommission_tests.rs"]
mod tests;

/// Disables the merge-check on a repository and deletes it.
///
/// Each step depends on the previous one and the first failure stops the
/// run. A merge-check that is not enabled is not a failure. Without a
/// merge-check client the disable step is skipped.
///
/// # Errors
///
/// Fails with a `NotFound` kind when the repository does not exist.
#[instrument(skip(ctx), fields(repository = %repo))]
pub async fn decommission(ctx: &ProvisionContext, repo: &RepositoryIdentity) -> ProvisionerResult<()> {
    info!("Fetching repository");
    let repository = ctx
        .github
        .get_repository(repo.organization(), repo.name())
        .await
        .map_err(|e| ProvisionerError::from(e).context("could not retrieve repository"))?;

    match &ctx.merge_check {
        Some(merge_check) => {
            info!(id = repository.id(), "Disabling merge-check");
            if let Err(e) = merge_check.disable(repository.id()).await {
                let error = ProvisionerError::from(e);
                if error.kind() != ErrorKind::AlreadyNotEnabled {
                    return Err(error.context("could not disable the merge-check"));
                }
                debug!("Merge-check was not enabled, moving on");
            }
        }
        None => warn!("No merge-check service configured, skipping disable"),
    }

    info!("Deleting repository");
    ctx.github
        .delete_repository(repo.organization(), repo.name())
        .await
        .map_err(|e| ProvisionerError::from(e).context("could not delete repository"))?;

    info!("Repository deleted");
    Ok(())
}
