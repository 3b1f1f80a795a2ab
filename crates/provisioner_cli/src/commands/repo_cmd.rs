//! Repository commands.
//!
//! `repo create` creates a repository in the configured organization and
//! applies the enabled rules. Running it against an existing repository
//! normalizes that repository instead of failing, so the command can be
//! re-run after a partial failure. `repo delete` disables the merge-check
//! and deletes the repository.

use clap::{ArgAction, Args, Subcommand};
use config_manager::AppConfig;
use provisioner_core::{
    decommission, provision, ProvisionReport, RepositoryDescriptor, RepositoryIdentity, RuleSet,
    RuleToggles,
};
use tracing::{info, instrument};

use crate::commands::{clients, load_configuration, GlobalArgs};
use crate::errors::Error;

#[cfg(test)]
#[path = "repo_cmd_tests.rs"]
mod tests;

/// Repository subcommands.
#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// Create a repository, or normalize an existing one, following the configured rules
    Create(CreateArgs),

    /// Delete a repository
    Delete(DeleteArgs),
}

/// Arguments of `repo create`.
///
/// Boolean flags take an optional value: `--has-wiki` enables the wiki,
/// `--has-wiki=false` disables it.
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Name of the repository
    pub name: String,

    /// Description of the repository
    #[arg(long, short)]
    pub description: Option<String>,

    /// Create a private repository
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub private: bool,

    /// Enable issues
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub has_issues: bool,

    /// Enable the wiki
    #[arg(long, default_value_t = false, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub has_wiki: bool,

    /// Enable GitHub pages
    #[arg(long, default_value_t = false, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub has_pages: bool,

    /// Register the repository with PullApprove
    #[arg(long, default_value_t = false, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub has_pullapprove: bool,

    /// Enable the merge-check
    #[arg(long, default_value_t = false, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub has_merge_check: bool,

    /// Grant the configured teams access
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub has_teams: bool,

    /// Grant the configured collaborators access
    #[arg(long, default_value_t = false, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub has_collaborators: bool,

    /// Create the configured labels
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub has_labels: bool,

    /// Remove the labels GitHub adds by default
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub rm_default_labels: bool,

    /// Create the configured webhooks
    #[arg(long, default_value_t = false, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub has_webhooks: bool,

    /// Protect the configured branches
    #[arg(long, default_value_t = true, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub has_branch_protections: bool,

    /// Impersonate the merge-check app before enabling the check
    /// (defaults to the configuration file)
    #[arg(long, action = ArgAction::Set, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub use_merge_check_app_credentials: Option<bool>,
}

impl CreateArgs {
    /// The rule switches selected on the command line.
    pub fn toggles(&self) -> RuleToggles {
        RuleToggles {
            pullapprove: self.has_pullapprove,
            merge_check: self.has_merge_check,
            teams: self.has_teams,
            collaborators: self.has_collaborators,
            labels: self.has_labels,
            remove_default_labels: self.rm_default_labels,
            webhooks: self.has_webhooks,
            branch_protections: self.has_branch_protections,
            use_merge_check_app_credentials: self.use_merge_check_app_credentials,
        }
    }

    /// The attributes a new repository is created with.
    pub fn descriptor(&self) -> RepositoryDescriptor {
        RepositoryDescriptor {
            description: self.description.clone(),
            private: self.private,
            has_issues: self.has_issues,
            has_wiki: self.has_wiki,
            has_pages: self.has_pages,
            ..RepositoryDescriptor::default()
        }
    }
}

/// Arguments of `repo delete`.
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Name of the repository
    pub name: String,
}

/// Executes a repository command.
pub async fn execute(cmd: &RepoCommands, global: &GlobalArgs) -> Result<(), Error> {
    let config = load_configuration(global)?;
    match cmd {
        RepoCommands::Create(args) => {
            let report = create(args, &config).await?;
            println!("{}", summary(&config.github.organization, &args.name, &report));
            Ok(())
        }
        RepoCommands::Delete(args) => {
            delete(args, &config).await?;
            println!("Repository {}/{} deleted", config.github.organization, args.name);
            Ok(())
        }
    }
}

#[instrument(skip(args, config), fields(name = %args.name))]
async fn create(args: &CreateArgs, config: &AppConfig) -> Result<ProvisionReport, Error> {
    let rules = RuleSet::from_config(config, &args.toggles());
    let ctx = clients::provision_context(config, &rules)?;
    let repo = RepositoryIdentity::new(&config.github.organization, &args.name)?;

    info!(rules = ?rules.enabled_rules(), "Provisioning repository");
    let report = provision(&ctx, &repo, &args.descriptor(), &rules)
        .await?
        .into_result()?;
    Ok(report)
}

#[instrument(skip(args, config), fields(name = %args.name))]
async fn delete(args: &DeleteArgs, config: &AppConfig) -> Result<(), Error> {
    let ctx = clients::decommission_context(config)?;
    let repo = RepositoryIdentity::new(&config.github.organization, &args.name)?;

    decommission(&ctx, &repo).await?;
    Ok(())
}

/// The line printed after a successful `repo create`.
pub fn summary(organization: &str, name: &str, report: &ProvisionReport) -> String {
    match (&report.repository, report.created) {
        (Some(repository), true) => {
            format!("Repository created: {}", repository.clone_url())
        }
        _ => format!("Repository {organization}/{name} normalized"),
    }
}
