//! Tests for configuration error types.

use super::*;

#[test]
fn configuration_error_required_missing_message() {
    let error = ConfigurationError::RequiredConfigMissing {
        key: "github.organization".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "Missing required setting 'github.organization'"
    );
}

#[test]
fn configuration_error_invalid_configuration_message() {
    let error = ConfigurationError::InvalidConfiguration {
        field: "github.labels[0].color".to_string(),
        reason: "'red' is not a six digit hex color".to_string(),
    };

    assert_eq!(
        error.to_string(),
        "Invalid value for github.labels[0].color: 'red' is not a six digit hex color"
    );
}

#[test]
fn configuration_error_file_errors() {
    let not_found = ConfigurationError::FileNotFound {
        path: "/tmp/missing.toml".to_string(),
    };
    let access = ConfigurationError::FileAccessError {
        path: "/tmp/locked.toml".to_string(),
        reason: "permission denied".to_string(),
    };

    assert!(not_found.to_string().contains("/tmp/missing.toml"));
    assert!(access.to_string().contains("permission denied"));
    assert_ne!(not_found, access);
}
