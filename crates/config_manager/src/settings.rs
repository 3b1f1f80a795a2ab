//! Configuration model.
//!
//! The configuration file is TOML with one table per remote service:
//!
//! ```toml
//! [github]
//! organization = "acme"
//! token = "ghp_..."
//! remove_default_labels = true
//!
//! [[github.teams]]
//! id = 1234
//! permission = "push"
//!
//! [[github.labels]]
//! name = "needs-review"
//! color = "fbca04"
//!
//! [github.protections]
//! master = ["ci/build"]
//!
//! [pullapprove]
//! token = "pa-token"
//!
//! [merge_check]
//! url = "https://zappr.example.com"
//!
//! [hiring]
//! organization = "acme-hiring"
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::{ConfigurationError, ConfigurationResult};

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

/// The permissions GitHub accepts for team and collaborator access.
pub const VALID_PERMISSIONS: [&str; 5] = ["pull", "triage", "push", "maintain", "admin"];

/// Root of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// The organization repositories are provisioned in
    pub github: GitHubSettings,

    /// The approval-policy service
    pub pullapprove: PullApproveSettings,

    /// The merge-check service
    pub merge_check: MergeCheckSettings,

    /// The organization hiring tests are provisioned in
    pub hiring: HiringSettings,
}

impl AppConfig {
    /// Fills in tokens the file left empty.
    ///
    /// The value normally comes from the `GITHUB_TOKEN` environment variable
    /// and seeds both the main and the hiring organization.
    pub fn apply_token_default(&mut self, token: Option<&str>) {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return;
        };

        if is_blank(&self.github.token) {
            debug!("Using the environment token for the GitHub organization");
            self.github.token = Some(SecretString::from(token.to_string()));
        }
        if is_blank(&self.hiring.token) {
            debug!("Using the environment token for the hiring organization");
            self.hiring.token = Some(SecretString::from(token.to_string()));
        }
    }

    /// Applies `--token` and `--organization` overrides from the command line.
    ///
    /// The token replaces both the main and the hiring token; the organization
    /// only replaces the main one.
    pub fn apply_overrides(&mut self, token: Option<&str>, organization: Option<&str>) {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.github.token = Some(SecretString::from(token.to_string()));
            self.hiring.token = Some(SecretString::from(token.to_string()));
        }
        if let Some(organization) = organization.filter(|o| !o.is_empty()) {
            self.github.organization = organization.to_string();
        }
    }
}

/// The `[github]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub organization: String,
    pub token: Option<SecretString>,
    /// Remove the labels GitHub adds to every new repository
    pub remove_default_labels: bool,
    pub teams: Vec<TeamSetting>,
    pub collaborators: Vec<CollaboratorSetting>,
    pub labels: Vec<LabelSetting>,
    pub webhooks: Vec<WebhookSetting>,
    /// Branch name to the status check contexts required on it
    pub protections: BTreeMap<String, Vec<String>>,
}

impl GitHubSettings {
    /// Returns the token, or an error naming the missing key.
    pub fn require_token(&self) -> ConfigurationResult<&SecretString> {
        require_secret(&self.token, "github.token")
    }

    /// Checks the settings needed by every GitHub operation.
    ///
    /// # Errors
    ///
    /// * `RequiredConfigMissing` when the organization or token is empty.
    /// * `InvalidConfiguration` for an unknown permission or a malformed label color.
    pub fn validate(&self) -> ConfigurationResult<()> {
        if self.organization.trim().is_empty() {
            return Err(ConfigurationError::RequiredConfigMissing {
                key: "github.organization".to_string(),
            });
        }
        self.require_token()?;

        for (i, team) in self.teams.iter().enumerate() {
            validate_permission(&format!("github.teams[{i}].permission"), &team.permission)?;
        }
        for (i, collaborator) in self.collaborators.iter().enumerate() {
            if collaborator.username.trim().is_empty() {
                return Err(ConfigurationError::InvalidConfiguration {
                    field: format!("github.collaborators[{i}].username"),
                    reason: "must not be empty".to_string(),
                });
            }
            validate_permission(
                &format!("github.collaborators[{i}].permission"),
                &collaborator.permission,
            )?;
        }
        for (i, label) in self.labels.iter().enumerate() {
            if !is_hex_color(&label.color) {
                return Err(ConfigurationError::InvalidConfiguration {
                    field: format!("github.labels[{i}].color"),
                    reason: format!("'{}' is not a six digit hex color", label.color),
                });
            }
        }
        for (i, hook) in self.webhooks.iter().enumerate() {
            if hook.hook_type.trim().is_empty() {
                return Err(ConfigurationError::InvalidConfiguration {
                    field: format!("github.webhooks[{i}].type"),
                    reason: "must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// A team granted access to every new repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TeamSetting {
    pub id: u64,
    pub permission: String,
}

/// A user granted access to every new repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollaboratorSetting {
    pub username: String,
    pub permission: String,
}

/// A label created on every new repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelSetting {
    pub name: String,
    /// Hex color without the leading `#`
    pub color: String,
}

/// A webhook created on every new repository.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookSetting {
    /// The hook type, `web` for regular webhooks
    #[serde(rename = "type")]
    pub hook_type: String,
    #[serde(default)]
    pub config: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub events: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub active: bool,
}

/// The `[pullapprove]` table.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PullApproveSettings {
    pub token: Option<SecretString>,
    /// Name of the policy marker file committed to the repository
    pub filename: String,
    /// Branch the marker file is committed to
    pub protected_branch_name: String,
    pub url: String,
}

impl Default for PullApproveSettings {
    fn default() -> Self {
        Self {
            token: None,
            filename: ".pullapprove.yml".to_string(),
            protected_branch_name: "master".to_string(),
            url: "https://pullapprove.com/api/".to_string(),
        }
    }
}

impl PullApproveSettings {
    /// Returns the token, or an error naming the missing key.
    pub fn require_token(&self) -> ConfigurationResult<&SecretString> {
        require_secret(&self.token, "pullapprove.token")
    }

    /// Checks that PullApprove can be used.
    pub fn validate(&self) -> ConfigurationResult<()> {
        self.require_token()?;
        if self.filename.trim().is_empty() {
            return Err(ConfigurationError::RequiredConfigMissing {
                key: "pullapprove.filename".to_string(),
            });
        }
        if self.protected_branch_name.trim().is_empty() {
            return Err(ConfigurationError::RequiredConfigMissing {
                key: "pullapprove.protected_branch_name".to_string(),
            });
        }
        Ok(())
    }
}

/// The `[merge_check]` table.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MergeCheckSettings {
    /// Root URL of the service; an empty URL means no service is configured
    pub url: String,
    /// A Zappr session token, used instead of the GitHub token when set
    pub token: Option<SecretString>,
    /// Impersonate the service's GitHub App before enabling the check
    pub use_app_credentials: bool,
    pub timeout_seconds: u64,
}

impl Default for MergeCheckSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            token: None,
            use_app_credentials: true,
            timeout_seconds: 30,
        }
    }
}

impl MergeCheckSettings {
    /// Whether a service URL is configured.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Checks that the merge-check service can be used.
    pub fn validate(&self) -> ConfigurationResult<()> {
        if !self.is_configured() {
            return Err(ConfigurationError::RequiredConfigMissing {
                key: "merge_check.url".to_string(),
            });
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidConfiguration {
                field: "merge_check.timeout_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// The `[hiring]` table.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HiringSettings {
    pub organization: String,
    pub token: Option<SecretString>,
    /// Repositories pushed to less than this many weeks ago are swept
    pub inactivity_weeks: u32,
}

impl Default for HiringSettings {
    fn default() -> Self {
        Self {
            organization: String::new(),
            token: None,
            inactivity_weeks: 5,
        }
    }
}

impl HiringSettings {
    /// Returns the token, or an error naming the missing key.
    pub fn require_token(&self) -> ConfigurationResult<&SecretString> {
        require_secret(&self.token, "hiring.token")
    }

    /// Checks the settings needed by the hiring commands.
    pub fn validate(&self) -> ConfigurationResult<()> {
        if self.organization.trim().is_empty() {
            return Err(ConfigurationError::RequiredConfigMissing {
                key: "hiring.organization".to_string(),
            });
        }
        self.require_token()?;
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn is_blank(secret: &Option<SecretString>) -> bool {
    secret
        .as_ref()
        .map_or(true, |s| s.expose_secret().trim().is_empty())
}

fn require_secret<'a>(
    secret: &'a Option<SecretString>,
    key: &str,
) -> ConfigurationResult<&'a SecretString> {
    match secret {
        Some(s) if !s.expose_secret().trim().is_empty() => Ok(s),
        _ => Err(ConfigurationError::RequiredConfigMissing {
            key: key.to_string(),
        }),
    }
}

fn validate_permission(field: &str, permission: &str) -> ConfigurationResult<()> {
    if VALID_PERMISSIONS.contains(&permission) {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidConfiguration {
            field: field.to_string(),
            reason: format!(
                "'{}' is not one of {}",
                permission,
                VALID_PERMISSIONS.join(", ")
            ),
        })
    }
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit())
}
