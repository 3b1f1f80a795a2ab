//! # Provisioner Core
//!
//! The workflows behind the `repo-provisioner` command line tool:
//!
//! - [`provision`] creates a repository, or adopts an existing one, and
//!   applies the enabled [`rules`] concurrently.
//! - [`decommission`] disables the merge-check and deletes a repository.
//! - [`sweep`] removes outside collaborators from recently active repositories.
//! - [`HiringTestProvisioner`] sends a copy of a template repository to a
//!   hiring candidate.
//!
//! Every workflow receives its remote clients explicitly, through a
//! [`ProvisionContext`] or as trait objects, so tests can substitute
//! in-memory implementations.
//!
//! ## Examples
//!
//! ```no_run
//! use provisioner_core::{
//!     provision, ProvisionContext, RepositoryDescriptor, RepositoryIdentity, RuleSet, RuleToggles,
//! };
//! use std::sync::Arc;
//!
//! # async fn example(config: config_manager::AppConfig, github: github_client::GitHubClient)
//! # -> Result<(), provisioner_core::ProvisionerError> {
//! let ctx = ProvisionContext::new(Arc::new(github));
//! let repo = RepositoryIdentity::new("acme", "acme-service")?;
//! let rules = RuleSet::from_config(&config, &RuleToggles::default());
//!
//! let report = provision(&ctx, &repo, &RepositoryDescriptor::default(), &rules)
//!     .await?
//!     .into_result()?;
//! println!("created: {}", report.created);
//! # Ok(())
//! # }
//! ```

pub mod appliers;
pub mod context;
pub mod decommission;
pub mod errors;
pub mod git;
pub mod hiring;
pub mod orchestrator;
pub mod request;
pub mod rules;
pub mod sweeper;

#[cfg(test)]
mod test_support;

pub use context::ProvisionContext;
pub use decommission::decommission;
pub use errors::{
    AggregateError, ErrorKind, ItemFailure, ProvisionerError, ProvisionerResult,
};
pub use git::GitMirror;
pub use hiring::{candidate_repository_name, HiringTestProvisioner, RepositoryMirror};
pub use orchestrator::{provision, ProvisionReport, RuleOutcome, RunResult, RunState};
pub use request::{RepositoryDescriptor, RepositoryIdentity};
pub use rules::{
    ApprovalPolicyOptions, LabelsOptions, MergeCheckOptions, Rule, RuleName, RuleSet, RuleToggles,
};
pub use sweeper::{sweep, SweepOptions, SweepSummary, MAX_PAGE_SIZE};
