//! Inputs of a provisioning run.

use config_manager::ConfigurationError;
use github_client::RepositoryCreatePayload;
use std::fmt;

use crate::errors::ProvisionerResult;

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;

/// Identifies the repository a run operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryIdentity {
    name: String,
    organization: String,
}

impl RepositoryIdentity {
    /// Creates an identity after checking that neither part is empty.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the empty field.
    pub fn new(organization: &str, name: &str) -> ProvisionerResult<Self> {
        if organization.trim().is_empty() {
            return Err(ConfigurationError::RequiredConfigMissing {
                key: "organization".to_string(),
            }
            .into());
        }
        if name.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfiguration {
                field: "name".to_string(),
                reason: "repository name must not be empty".to_string(),
            }
            .into());
        }

        Ok(Self {
            name: name.to_string(),
            organization: organization.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }
}

impl fmt::Display for RepositoryIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.name)
    }
}

/// Creation time attributes of a repository.
///
/// Written once when the repository is created. A run that finds the
/// repository already present does not touch these settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDescriptor {
    pub description: Option<String>,
    pub private: bool,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_pages: bool,
    pub auto_init: bool,
}

impl Default for RepositoryDescriptor {
    fn default() -> Self {
        Self {
            description: None,
            private: true,
            has_issues: true,
            has_wiki: false,
            has_pages: false,
            auto_init: true,
        }
    }
}

impl RepositoryDescriptor {
    /// Builds the creation payload for `name`.
    pub fn to_payload(&self, name: &str) -> RepositoryCreatePayload {
        RepositoryCreatePayload {
            name: name.to_string(),
            description: self.description.clone(),
            private: Some(self.private),
            has_issues: Some(self.has_issues),
            has_wiki: Some(self.has_wiki),
            has_pages: Some(self.has_pages),
            auto_init: Some(self.auto_init),
        }
    }
}
