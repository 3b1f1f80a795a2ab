//! Hiring test commands.
//!
//! Both commands run against the `[hiring]` organization, never the main one.

use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Subcommand};
use config_manager::AppConfig;
use provisioner_core::{
    sweep, GitMirror, HiringTestProvisioner, SweepOptions, SweepSummary, MAX_PAGE_SIZE,
};
use tracing::{info, instrument};

use crate::commands::{clients, load_configuration, GlobalArgs};
use crate::errors::Error;

#[cfg(test)]
#[path = "hiring_cmd_tests.rs"]
mod tests;

/// Hiring subcommands.
#[derive(Subcommand, Debug)]
pub enum HiringCommands {
    /// Send a copy of a hiring test to a candidate
    Send(SendArgs),

    /// Remove outside collaborators from recently active hiring test repositories
    Unseat(UnseatArgs),
}

/// Arguments of `hiring send`.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// GitHub login of the candidate
    pub username: String,

    /// Name of the template repository in the hiring organization
    pub repo: String,

    /// Branch of the template to send (defaults to the template's default branch)
    pub branch: Option<String>,
}

/// Arguments of `hiring unseat`.
#[derive(Args, Debug)]
pub struct UnseatArgs {
    /// Repositories fetched per page (at most 100)
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(1..=i64::from(MAX_PAGE_SIZE)))]
    pub page_size: u8,

    /// First page of the repository listing
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,
}

impl UnseatArgs {
    /// Sweep options for the command line and configured inactivity threshold.
    pub fn options(&self, inactivity_weeks: u32) -> SweepOptions {
        SweepOptions {
            page_size: self.page_size,
            start_page: self.page,
            inactivity_weeks,
        }
    }
}

/// Executes a hiring command.
pub async fn execute(cmd: &HiringCommands, global: &GlobalArgs) -> Result<(), Error> {
    let config = load_configuration(global)?;
    config.hiring.validate()?;

    match cmd {
        HiringCommands::Send(args) => send(args, &config).await,
        HiringCommands::Unseat(args) => {
            let summary = unseat(args, &config).await?;
            println!("{}", unseat_summary(&summary));
            Ok(())
        }
    }
}

#[instrument(skip(args, config), fields(candidate = %args.username, test = %args.repo))]
async fn send(args: &SendArgs, config: &AppConfig) -> Result<(), Error> {
    let token = config.hiring.require_token()?.clone();
    let github = clients::github(&token)?;
    let provisioner =
        HiringTestProvisioner::new(Arc::new(github), Arc::new(GitMirror::new()), token);

    let repository = provisioner
        .send(
            &config.hiring.organization,
            &args.username,
            &args.repo,
            args.branch.as_deref(),
        )
        .await?;

    info!(repository = %repository.full_name(), "Hiring test sent");
    println!("Hiring test sent: {}", repository.clone_url());
    Ok(())
}

#[instrument(skip(args, config))]
async fn unseat(args: &UnseatArgs, config: &AppConfig) -> Result<SweepSummary, Error> {
    let github = clients::github(config.hiring.require_token()?)?;
    let options = args.options(config.hiring.inactivity_weeks);

    let summary = sweep(&github, &config.hiring.organization, &options, Utc::now()).await?;
    Ok(summary)
}

/// The line printed after a sweep.
pub fn unseat_summary(summary: &SweepSummary) -> String {
    format!(
        "{} repositories fetched, {} skipped as inactive, {} collaborators removed",
        summary.repositories_fetched, summary.repositories_skipped, summary.collaborators_removed
    )
}
