//! Repository provisioning.
//!
//! A run creates the repository, or adopts it when it already exists, and
//! then applies every enabled rule. The rules run concurrently and all of them
//! run to completion; a failed rule never cancels its siblings. Failures that
//! mean a rule is already in place are absorbed, so a run can be repeated.

use config_manager::ConfigurationError;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use github_client::Repository;
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

use crate::appliers;
use crate::context::ProvisionContext;
use crate::errors::{ErrorKind, ProvisionerError, ProvisionerResult};
use crate::request::{RepositoryDescriptor, RepositoryIdentity};
use crate::rules::{RuleName, RuleSet};

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

/// How a single rule ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule changed the repository
    Applied,
    /// Every item of the rule was already in place
    AlreadySatisfied,
    Failed,
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuleOutcome::Applied => "applied",
            RuleOutcome::AlreadySatisfied => "already applied, skipped",
            RuleOutcome::Failed => "failed",
        })
    }
}

/// The outcome of one rule.
#[derive(Debug)]
pub struct RunResult {
    pub rule: RuleName,
    pub outcome: RuleOutcome,
    /// Set when `outcome` is `Failed`
    pub error: Option<ProvisionerError>,
}

/// Final state of a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Done,
    Failed,
}

/// What a provisioning run did.
#[derive(Debug)]
pub struct ProvisionReport {
    /// The repository as created; `None` when it already existed
    pub repository: Option<Repository>,
    /// Whether this run created the repository
    pub created: bool,
    /// One entry per dispatched rule, in completion order
    pub results: Vec<RunResult>,
}

impl ProvisionReport {
    pub fn state(&self) -> RunState {
        if self
            .results
            .iter()
            .any(|r| r.outcome == RuleOutcome::Failed)
        {
            RunState::Failed
        } else {
            RunState::Done
        }
    }

    /// The result recorded for `rule`, if it was dispatched.
    pub fn result(&self, rule: RuleName) -> Option<&RunResult> {
        self.results.iter().find(|r| r.rule == rule)
    }

    /// Returns the report when the run is done, otherwise the error of the
    /// first rule that failed.
    pub fn into_result(mut self) -> ProvisionerResult<Self> {
        let first_failure = self
            .results
            .iter_mut()
            .find(|r| r.outcome == RuleOutcome::Failed)
            .and_then(|r| r.error.take());
        match first_failure {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}

/// Creates or normalizes a repository and applies the enabled rules.
///
/// # Errors
///
/// The run stops before any rule is dispatched when an enabled rule has no
/// client or when creating the repository fails for any reason other than the
/// repository already existing. Rule failures do not produce an error here;
/// they are recorded in the report, see [`ProvisionReport::into_result`].
#[instrument(skip(ctx, descriptor, rules), fields(repository = %repo))]
pub async fn provision(
    ctx: &ProvisionContext,
    repo: &RepositoryIdentity,
    descriptor: &RepositoryDescriptor,
    rules: &RuleSet,
) -> ProvisionerResult<ProvisionReport> {
    ctx.check_rules(rules)?;

    info!("Creating repository");
    let payload = descriptor.to_payload(repo.name());
    let (repository, created) = match ctx
        .github
        .create_org_repository(repo.organization(), &payload)
        .await
    {
        Ok(repository) => {
            info!(id = repository.id(), "Repository created");
            (Some(repository), true)
        }
        Err(e) => {
            let error = ProvisionerError::from(e);
            if error.kind() != ErrorKind::AlreadyExists {
                error!(error = %error, "Could not create repository");
                return Err(error.context("could not create repository"));
            }
            info!("Repository already exists, trying to normalize it");
            (None, false)
        }
    };

    let repo_id = repository.as_ref().map(Repository::id);
    let enabled = rules.enabled_rules();
    debug!(rules = ?enabled, "Dispatching rules");

    let mut pending: FuturesUnordered<BoxFuture<'_, (RuleName, ProvisionerResult<()>)>> = enabled
        .into_iter()
        .map(|rule| {
            let task: BoxFuture<'_, _> = Box::pin(async move {
                info!(rule = %rule, "Applying rule");
                (rule, apply_rule(ctx, rule, repo, repo_id, rules).await)
            });
            task
        })
        .collect();

    let mut results = Vec::new();
    while let Some((rule, result)) = pending.next().await {
        let run_result = classify(rule, result);
        match run_result.outcome {
            RuleOutcome::Failed => {
                if let Some(error) = &run_result.error {
                    error!(rule = %rule, error = %error, "Rule failed");
                }
            }
            outcome => info!(rule = %rule, "{outcome}"),
        }
        results.push(run_result);
    }

    let report = ProvisionReport {
        repository,
        created,
        results,
    };
    match report.state() {
        RunState::Done => info!("Repository provisioned"),
        RunState::Failed => {
            let failed = report
                .results
                .iter()
                .filter(|r| r.outcome == RuleOutcome::Failed)
                .count();
            warn!(failed, total = report.results.len(), "Provisioning failed");
        }
    }
    Ok(report)
}

async fn apply_rule(
    ctx: &ProvisionContext,
    rule: RuleName,
    repo: &RepositoryIdentity,
    repo_id: Option<u64>,
    rules: &RuleSet,
) -> ProvisionerResult<()> {
    let github = ctx.github.as_ref();
    match rule {
        RuleName::PullApprove => {
            let policy = ctx
                .approval_policy
                .as_deref()
                .ok_or_else(|| missing_client(rule))?;
            appliers::apply_pull_approve(github, policy, repo, &rules.pull_approve.options).await
        }
        RuleName::MergeCheck => {
            let merge_check = ctx
                .merge_check
                .as_deref()
                .ok_or_else(|| missing_client(rule))?;
            appliers::apply_merge_check(
                github,
                merge_check,
                repo,
                repo_id,
                &rules.merge_check.options,
            )
            .await
        }
        RuleName::Teams => appliers::apply_teams(github, repo, &rules.teams.options).await,
        RuleName::Collaborators => {
            appliers::apply_collaborators(github, repo, &rules.collaborators.options).await
        }
        RuleName::Labels => appliers::apply_labels(github, repo, &rules.labels.options).await,
        RuleName::Webhooks => appliers::apply_webhooks(github, repo, &rules.webhooks.options).await,
        RuleName::BranchProtections => {
            appliers::apply_branch_protections(github, repo, &rules.branch_protections.options)
                .await
        }
    }
}

fn missing_client(rule: RuleName) -> ProvisionerError {
    ConfigurationError::RequiredConfigMissing {
        key: format!("{rule} client"),
    }
    .into()
}

/// Turns the raw result of a rule into its outcome.
fn classify(rule: RuleName, result: ProvisionerResult<()>) -> RunResult {
    let failed = |error: ProvisionerError| RunResult {
        rule,
        outcome: RuleOutcome::Failed,
        error: Some(error.context(format!("could not apply {rule}"))),
    };
    let satisfied = |outcome| RunResult {
        rule,
        outcome,
        error: None,
    };

    match result {
        Ok(()) => satisfied(RuleOutcome::Applied),
        Err(ProvisionerError::Aggregate(aggregate)) => {
            let (absorbed, rejected) =
                aggregate.partition(|f| f.tolerated || rule.absorbs(f.error.kind()));
            for failure in absorbed.failures() {
                debug!(rule = %rule, item = %failure.item, kind = %failure.error.kind(), "Already applied");
            }
            if rejected.has_failures() {
                failed(ProvisionerError::Aggregate(rejected))
            } else if absorbed.failures().len() == absorbed.attempted() {
                satisfied(RuleOutcome::AlreadySatisfied)
            } else {
                satisfied(RuleOutcome::Applied)
            }
        }
        Err(error) if rule.absorbs(error.kind()) => {
            debug!(rule = %rule, kind = %error.kind(), "Already applied");
            satisfied(RuleOutcome::AlreadySatisfied)
        }
        Err(error) => failed(error),
    }
}
