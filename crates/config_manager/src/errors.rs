//! Errors raised while loading and validating the configuration.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Configuration errors.
///
/// Every command validates its configuration before the first remote call,
/// so these errors never leave a repository half provisioned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// An explicitly requested file does not exist.
    #[error("No configuration file at {path}")]
    FileNotFound { path: String },

    #[error("Cannot read the configuration file {path}: {reason}")]
    FileAccessError { path: String, reason: String },

    /// The file is not valid TOML or does not match the expected tables.
    #[error("Malformed configuration: {reason}")]
    ParseError { reason: String },

    /// A setting is present but unusable, e.g. an unknown permission.
    #[error("Invalid value for {field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// A setting the command needs is absent or empty. `key` uses the dotted
    /// `table.field` form of the file.
    #[error("Missing required setting '{key}'")]
    RequiredConfigMissing { key: String },
}

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
