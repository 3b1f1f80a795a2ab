//! Rule appliers.
//!
//! One function per rule. An applier calls the remote client once per item of
//! its options and keeps going after a failed item; the failures come back as
//! an [`AggregateError`] for the orchestrator to classify. Appliers never
//! decide whether they should run.

use config_manager::{CollaboratorSetting, TeamSetting, WebhookSetting};
use github_client::{
    BranchProtectionPayload, FileCreatePayload, Label, RepositoryClient, WebhookPayload,
    DEFAULT_LABELS,
};
use merge_check_client::MergeCheckClient;
use pullapprove_client::ApprovalPolicyClient;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::errors::{AggregateError, ErrorKind, ProvisionerError, ProvisionerResult};
use crate::request::RepositoryIdentity;
use crate::rules::{ApprovalPolicyOptions, LabelsOptions, MergeCheckOptions, RuleName};

#[cfg(test)]
#[path = "appliers_tests.rs"]
mod tests;

/// Commit message of the approval-policy marker file.
pub const POLICY_COMMIT_MESSAGE: &str = "Initialize repository :tada:";

/// Records the outcome of one item in `failures`.
fn record<E>(
    failures: &mut AggregateError,
    rule: RuleName,
    index: usize,
    item: String,
    result: Result<(), E>,
) where
    E: Into<ProvisionerError>,
{
    failures.attempt();
    let Err(e) = result else {
        debug!(rule = %rule, item = %item, "Applied");
        return;
    };

    let error: ProvisionerError = e.into();
    if rule.absorbs(error.kind()) {
        debug!(rule = %rule, item = %item, kind = %error.kind(), "Already applied");
    } else {
        warn!(rule = %rule, item = %item, error = %error, "Failed to apply");
    }
    failures.push(index, item, error);
}

/// Commits the policy marker file and registers the repository with the
/// approval-policy service.
///
/// The marker file extends the organization wide policy. When the file is
/// already present the repository was registered by an earlier run, so the
/// registration is not repeated.
pub async fn apply_pull_approve(
    github: &dyn RepositoryClient,
    policy: &dyn ApprovalPolicyClient,
    repo: &RepositoryIdentity,
    options: &ApprovalPolicyOptions,
) -> ProvisionerResult<()> {
    let mut failures = AggregateError::new();
    let content = format!("extends: {}\n", repo.organization());
    let payload = FileCreatePayload::new(
        POLICY_COMMIT_MESSAGE,
        &content,
        &options.protected_branch_name,
    );

    let created = github
        .create_file(repo.organization(), repo.name(), &options.filename, &payload)
        .await;
    let file_exists = matches!(created, Err(github_client::Error::AlreadyExists(_)));
    record(
        &mut failures,
        RuleName::PullApprove,
        0,
        format!("file '{}'", options.filename),
        created,
    );

    if file_exists {
        info!(repository = %repo, "PullApprove file already present, skipping registration");
        return failures.into_result();
    }

    let registered = policy.register(repo.name(), repo.organization()).await;
    record(
        &mut failures,
        RuleName::PullApprove,
        1,
        "registration".to_string(),
        registered,
    );

    failures.into_result()
}

/// Enables the merge-check service on the repository.
///
/// The service addresses repositories by their numeric ID. When the caller
/// does not know it, for example because the repository already existed, it
/// is fetched here.
pub async fn apply_merge_check(
    github: &dyn RepositoryClient,
    merge_check: &dyn MergeCheckClient,
    repo: &RepositoryIdentity,
    known_id: Option<u64>,
    options: &MergeCheckOptions,
) -> ProvisionerResult<()> {
    let repo_id = match known_id {
        Some(id) => id,
        None => {
            debug!(repository = %repo, "Fetching repository details from GitHub");
            github
                .get_repository(repo.organization(), repo.name())
                .await
                .map_err(|e| {
                    ProvisionerError::from(e).context(
                        "information required to enable the merge-check on the repository was not found",
                    )
                })?
                .id()
        }
    };

    if options.use_app_credentials {
        debug!("Retrieving the merge-check GitHub App token");
        merge_check.impersonate_app().await.map_err(|e| {
            let unauthorized = matches!(e, merge_check_client::Error::Unauthorized);
            let error = ProvisionerError::from(e);
            if unauthorized {
                error.context(
                    "could not retrieve the merge-check app token; log out of the merge-check service, log back in and try again",
                )
            } else {
                error.context("could not retrieve the merge-check app token")
            }
        })?;
    }

    match merge_check.enable(repo_id).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error = ProvisionerError::from(e);
            if error.kind() == ErrorKind::AlreadyEnabled {
                debug!(repository = %repo, "Merge-check already enabled");
                Err(error)
            } else {
                Err(error.context("could not enable the merge-check"))
            }
        }
    }
}

/// Grants each configured team access to the repository.
pub async fn apply_teams(
    github: &dyn RepositoryClient,
    repo: &RepositoryIdentity,
    teams: &[TeamSetting],
) -> ProvisionerResult<()> {
    let mut failures = AggregateError::new();
    for (index, team) in teams.iter().enumerate() {
        let result = github
            .add_team_to_repository(team.id, repo.organization(), repo.name(), &team.permission)
            .await;
        record(
            &mut failures,
            RuleName::Teams,
            index,
            format!("team {}", team.id),
            result,
        );
    }
    failures.into_result()
}

/// Adds each configured collaborator to the repository.
pub async fn apply_collaborators(
    github: &dyn RepositoryClient,
    repo: &RepositoryIdentity,
    collaborators: &[CollaboratorSetting],
) -> ProvisionerResult<()> {
    let mut failures = AggregateError::new();
    for (index, collaborator) in collaborators.iter().enumerate() {
        let result = github
            .add_collaborator(
                repo.organization(),
                repo.name(),
                &collaborator.username,
                &collaborator.permission,
            )
            .await;
        record(
            &mut failures,
            RuleName::Collaborators,
            index,
            format!("collaborator '{}'", collaborator.username),
            result,
        );
    }
    failures.into_result()
}

/// Creates the configured labels, then removes GitHub's default labels when
/// asked to.
///
/// A default label that is also configured is kept.
pub async fn apply_labels(
    github: &dyn RepositoryClient,
    repo: &RepositoryIdentity,
    options: &LabelsOptions,
) -> ProvisionerResult<()> {
    let mut failures = AggregateError::new();

    for (index, setting) in options.labels.iter().enumerate() {
        let label = Label {
            name: setting.name.clone(),
            color: setting.color.clone(),
        };
        let result = github
            .create_label(repo.organization(), repo.name(), &label)
            .await;
        record(
            &mut failures,
            RuleName::Labels,
            index,
            format!("label '{}'", label.name),
            result,
        );
    }

    if options.remove_default_labels {
        let offset = options.labels.len();
        let removable = DEFAULT_LABELS
            .iter()
            .filter(|name| !options.labels.iter().any(|l| l.name == **name));
        for (index, name) in removable.enumerate() {
            let result = github
                .delete_label(repo.organization(), repo.name(), name)
                .await;
            let item = format!("default label '{name}'");
            match result.map_err(ProvisionerError::from) {
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    failures.attempt();
                    debug!(rule = %RuleName::Labels, item = %item, "Already removed");
                    failures.push_tolerated(offset + index, item, e);
                }
                result => record(&mut failures, RuleName::Labels, offset + index, item, result),
            }
        }
    }

    failures.into_result()
}

/// Creates each configured webhook.
pub async fn apply_webhooks(
    github: &dyn RepositoryClient,
    repo: &RepositoryIdentity,
    webhooks: &[WebhookSetting],
) -> ProvisionerResult<()> {
    let mut failures = AggregateError::new();
    for (index, hook) in webhooks.iter().enumerate() {
        let payload = WebhookPayload {
            name: hook.hook_type.clone(),
            config: hook.config.clone(),
            events: hook.events.clone(),
            active: hook.active,
        };
        let result = github
            .create_webhook(repo.organization(), repo.name(), &payload)
            .await;
        let target = hook
            .config
            .get("url")
            .and_then(|url| url.as_str())
            .unwrap_or(&hook.hook_type);
        record(
            &mut failures,
            RuleName::Webhooks,
            index,
            format!("webhook '{target}'"),
            result,
        );
    }
    failures.into_result()
}

/// Requires the configured status checks on each protected branch.
pub async fn apply_branch_protections(
    github: &dyn RepositoryClient,
    repo: &RepositoryIdentity,
    protections: &BTreeMap<String, Vec<String>>,
) -> ProvisionerResult<()> {
    let mut failures = AggregateError::new();
    for (index, (branch, contexts)) in protections.iter().enumerate() {
        let payload = BranchProtectionPayload::with_contexts(contexts.clone());
        let result = github
            .update_branch_protection(repo.organization(), repo.name(), branch, &payload)
            .await;
        record(
            &mut failures,
            RuleName::BranchProtections,
            index,
            format!("branch '{branch}'"),
            result,
        );
    }
    failures.into_result()
}
