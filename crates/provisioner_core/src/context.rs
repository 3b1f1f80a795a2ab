//! The remote clients a workflow runs against.

use config_manager::ConfigurationError;
use github_client::RepositoryClient;
use merge_check_client::MergeCheckClient;
use pullapprove_client::ApprovalPolicyClient;
use std::sync::Arc;

use crate::errors::ProvisionerResult;
use crate::rules::{RuleName, RuleSet};

/// Clients passed explicitly into every orchestrator.
///
/// The approval-policy and merge-check clients are optional because they are
/// only built when their service is configured.
#[derive(Clone)]
pub struct ProvisionContext {
    pub github: Arc<dyn RepositoryClient>,
    pub approval_policy: Option<Arc<dyn ApprovalPolicyClient>>,
    pub merge_check: Option<Arc<dyn MergeCheckClient>>,
}

impl ProvisionContext {
    /// A context with only the GitHub client.
    pub fn new(github: Arc<dyn RepositoryClient>) -> Self {
        Self {
            github,
            approval_policy: None,
            merge_check: None,
        }
    }

    pub fn with_approval_policy(mut self, client: Arc<dyn ApprovalPolicyClient>) -> Self {
        self.approval_policy = Some(client);
        self
    }

    pub fn with_merge_check(mut self, client: Arc<dyn MergeCheckClient>) -> Self {
        self.merge_check = Some(client);
        self
    }

    /// Checks that every enabled rule has the client it needs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::RequiredConfigMissing` naming the
    /// configuration key that would have produced the missing client.
    pub fn check_rules(&self, rules: &RuleSet) -> ProvisionerResult<()> {
        if rules.is_enabled(RuleName::PullApprove) && self.approval_policy.is_none() {
            return Err(ConfigurationError::RequiredConfigMissing {
                key: "pullapprove.token".to_string(),
            }
            .into());
        }
        if rules.is_enabled(RuleName::MergeCheck) && self.merge_check.is_none() {
            return Err(ConfigurationError::RequiredConfigMissing {
                key: "merge_check.url".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
