//! Command modules for the repository provisioner CLI.
//!
//! - `repo_cmd`: create, normalize and delete repositories
//! - `hiring_cmd`: send hiring tests and sweep their collaborators
//! - `update_cmd`: self-update from the tool's release feed

use std::path::PathBuf;

use clap::Args;
use config_manager::{load_config, AppConfig, TOKEN_ENV_VAR};

use crate::errors::Error;

pub mod clients;
pub mod hiring_cmd;
pub mod repo_cmd;
pub mod update_cmd;

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;

/// Flags accepted by every command.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Path to the configuration file (defaults to `.github.toml` in the
    /// current directory, then in the home directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// GitHub token, overrides both tokens in the configuration file
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// GitHub organization, overrides the configuration file
    #[arg(long, global = true)]
    pub organization: Option<String>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Loads the configuration and applies the command line overrides.
pub fn load_configuration(global: &GlobalArgs) -> Result<AppConfig, Error> {
    let env_token = std::env::var(TOKEN_ENV_VAR).ok();
    let mut config = load_config(global.config.as_deref(), env_token.as_deref())?;
    config.apply_overrides(global.token.as_deref(), global.organization.as_deref());
    Ok(config)
}
