//! Configuration management for the repository provisioner.
//!
//! Loads the `.github.toml` configuration file, fills in defaults and
//! validates the parts a command needs before any network call is made.

pub mod errors;
pub mod loader;
pub mod settings;

pub use errors::{ConfigurationError, ConfigurationResult};
pub use loader::{
    load_config, load_from_path, resolve_config_path, DEFAULT_CONFIG_FILENAME, TOKEN_ENV_VAR,
};
pub use settings::{
    AppConfig, CollaboratorSetting, GitHubSettings, HiringSettings, LabelSetting,
    MergeCheckSettings, PullApproveSettings, TeamSetting, WebhookSetting, VALID_PERMISSIONS,
};
