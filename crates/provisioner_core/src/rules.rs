//! The fixed set of configuration rules applied to a repository.
//!
//! A [`RuleSet`] is built once per run from the configuration file and the
//! command line toggles and is read-only afterwards.

use config_manager::{AppConfig, CollaboratorSetting, LabelSetting, TeamSetting, WebhookSetting};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::ErrorKind;

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;

/// Names of the rules, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleName {
    PullApprove,
    MergeCheck,
    Teams,
    Collaborators,
    Labels,
    Webhooks,
    BranchProtections,
}

impl RuleName {
    /// Every rule, in dispatch order.
    pub const ALL: [RuleName; 7] = [
        RuleName::PullApprove,
        RuleName::MergeCheck,
        RuleName::Teams,
        RuleName::Collaborators,
        RuleName::Labels,
        RuleName::Webhooks,
        RuleName::BranchProtections,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuleName::PullApprove => "pullapprove",
            RuleName::MergeCheck => "merge-check",
            RuleName::Teams => "teams",
            RuleName::Collaborators => "collaborators",
            RuleName::Labels => "labels",
            RuleName::Webhooks => "webhooks",
            RuleName::BranchProtections => "branch-protections",
        }
    }

    /// Whether a failure of `kind` means this rule is already satisfied.
    ///
    /// Only the "already applied" kinds qualify. Item level exceptions, such
    /// as a default label that is already gone, are tagged by the applier.
    pub fn absorbs(self, kind: ErrorKind) -> bool {
        kind.is_already_applied()
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule toggle together with the options its applier needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule<T> {
    pub enabled: bool,
    pub options: T,
}

impl<T> Rule<T> {
    pub fn new(enabled: bool, options: T) -> Self {
        Self { enabled, options }
    }
}

/// Options of the Labels rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelsOptions {
    /// Delete GitHub's built-in labels after creating the configured ones
    pub remove_default_labels: bool,
    pub labels: Vec<LabelSetting>,
}

/// Options of the PullApprove rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalPolicyOptions {
    /// Path of the policy marker file
    pub filename: String,
    /// Branch the marker file is committed to
    pub protected_branch_name: String,
}

/// Options of the MergeCheck rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeCheckOptions {
    /// Impersonate the service's GitHub App before enabling the check
    pub use_app_credentials: bool,
}

/// Which rules the caller asked for.
///
/// Defaults mirror the command line defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleToggles {
    pub pullapprove: bool,
    pub merge_check: bool,
    pub teams: bool,
    pub collaborators: bool,
    pub labels: bool,
    /// Allows the configured default label removal; `false` vetoes it
    pub remove_default_labels: bool,
    pub webhooks: bool,
    pub branch_protections: bool,
    /// Overrides `merge_check.use_app_credentials` when set
    pub use_merge_check_app_credentials: Option<bool>,
}

impl Default for RuleToggles {
    fn default() -> Self {
        Self {
            pullapprove: false,
            merge_check: false,
            teams: true,
            collaborators: false,
            labels: true,
            remove_default_labels: true,
            webhooks: false,
            branch_protections: true,
            use_merge_check_app_credentials: None,
        }
    }
}

/// The rules of one provisioning run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    pub pull_approve: Rule<ApprovalPolicyOptions>,
    pub merge_check: Rule<MergeCheckOptions>,
    pub teams: Rule<Vec<TeamSetting>>,
    pub collaborators: Rule<Vec<CollaboratorSetting>>,
    pub labels: Rule<LabelsOptions>,
    pub webhooks: Rule<Vec<WebhookSetting>>,
    /// Branch name to the status check contexts required on it
    pub branch_protections: Rule<BTreeMap<String, Vec<String>>>,
}

impl RuleSet {
    /// Builds the rule set from the configuration and the caller's toggles.
    pub fn from_config(config: &AppConfig, toggles: &RuleToggles) -> Self {
        let github = &config.github;
        Self {
            pull_approve: Rule::new(
                toggles.pullapprove,
                ApprovalPolicyOptions {
                    filename: config.pullapprove.filename.clone(),
                    protected_branch_name: config.pullapprove.protected_branch_name.clone(),
                },
            ),
            merge_check: Rule::new(
                toggles.merge_check,
                MergeCheckOptions {
                    use_app_credentials: toggles
                        .use_merge_check_app_credentials
                        .unwrap_or(config.merge_check.use_app_credentials),
                },
            ),
            teams: Rule::new(toggles.teams, github.teams.clone()),
            collaborators: Rule::new(toggles.collaborators, github.collaborators.clone()),
            labels: Rule::new(
                toggles.labels,
                LabelsOptions {
                    remove_default_labels: github.remove_default_labels
                        && toggles.remove_default_labels,
                    labels: github.labels.clone(),
                },
            ),
            webhooks: Rule::new(toggles.webhooks, github.webhooks.clone()),
            branch_protections: Rule::new(toggles.branch_protections, github.protections.clone()),
        }
    }

    pub fn is_enabled(&self, rule: RuleName) -> bool {
        match rule {
            RuleName::PullApprove => self.pull_approve.enabled,
            RuleName::MergeCheck => self.merge_check.enabled,
            RuleName::Teams => self.teams.enabled,
            RuleName::Collaborators => self.collaborators.enabled,
            RuleName::Labels => self.labels.enabled,
            RuleName::Webhooks => self.webhooks.enabled,
            RuleName::BranchProtections => self.branch_protections.enabled,
        }
    }

    /// The enabled rules, in dispatch order.
    pub fn enabled_rules(&self) -> Vec<RuleName> {
        RuleName::ALL
            .into_iter()
            .filter(|rule| self.is_enabled(*rule))
            .collect()
    }
}
