//! Locating and reading the configuration file.

use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::errors::{ConfigurationError, ConfigurationResult};
use crate::settings::AppConfig;

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = ".github.toml";

/// Environment variable that seeds the GitHub tokens
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Resolves the path to the configuration file.
///
/// An explicit path always wins. Otherwise `.github.toml` is looked up in
/// `cwd` and then in `home`; `None` means no file was found.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    cwd: &Path,
    home: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    std::iter::once(cwd)
        .chain(home)
        .map(|dir| dir.join(DEFAULT_CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

/// Reads and parses a configuration file.
///
/// # Errors
///
/// * `FileNotFound` when the file does not exist.
/// * `FileAccessError` when it cannot be read.
/// * `ParseError` when it is not valid TOML for [`AppConfig`].
pub fn load_from_path(path: &Path) -> ConfigurationResult<AppConfig> {
    debug!("Loading configuration from {:?}", path);

    if !path.exists() {
        return Err(ConfigurationError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigurationError::FileAccessError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    toml::from_str(&content).map_err(|e| ConfigurationError::ParseError {
        reason: format!("{}: {}", path.display(), e),
    })
}

/// Loads the configuration the command line asked for.
///
/// A missing default file yields an empty configuration, but a missing
/// explicit file is an error. `env_token` seeds tokens the file left empty.
pub fn load_config(
    explicit: Option<&Path>,
    env_token: Option<&str>,
) -> ConfigurationResult<AppConfig> {
    let cwd = std::env::current_dir().map_err(|e| ConfigurationError::FileAccessError {
        path: ".".to_string(),
        reason: e.to_string(),
    })?;
    let home = dirs::home_dir();

    let mut config = match resolve_config_path(explicit, &cwd, home.as_deref()) {
        Some(path) => {
            let config = load_from_path(&path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => {
            debug!("No configuration file found, using defaults");
            AppConfig::default()
        }
    };

    config.apply_token_default(env_token);
    Ok(config)
}
