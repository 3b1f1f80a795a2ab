use super::*;
use std::error::Error as StdError;

#[test]
fn test_github_errors_map_to_kinds() {
    let cases = [
        (
            github_client::Error::AlreadyExists("Repository acme/a".to_string()),
            ErrorKind::AlreadyExists,
        ),
        (
            github_client::Error::QuotaExceeded("limit".to_string()),
            ErrorKind::QuotaExceeded,
        ),
        (
            github_client::Error::NotFound("Label 'bug'".to_string()),
            ErrorKind::NotFound,
        ),
        (
            github_client::Error::ServerError {
                status: 500,
                message: "boom".to_string(),
            },
            ErrorKind::ServerError,
        ),
        (
            github_client::Error::RemoteError("reset".to_string()),
            ErrorKind::RemoteError,
        ),
    ];

    for (error, kind) in cases {
        assert_eq!(ProvisionerError::from(error).kind(), kind);
    }
}

#[test]
fn test_merge_check_errors_map_to_kinds() {
    assert_eq!(
        ProvisionerError::from(merge_check_client::Error::AlreadyEnabled).kind(),
        ErrorKind::AlreadyEnabled
    );
    assert_eq!(
        ProvisionerError::from(merge_check_client::Error::AlreadyNotEnabled).kind(),
        ErrorKind::AlreadyNotEnabled
    );
    assert_eq!(
        ProvisionerError::from(merge_check_client::Error::Unauthorized).kind(),
        ErrorKind::Unauthorized
    );
}

#[test]
fn test_pullapprove_errors_map_to_kinds() {
    assert_eq!(
        ProvisionerError::from(pullapprove_client::Error::Unauthorized).kind(),
        ErrorKind::Unauthorized
    );
    assert_eq!(
        ProvisionerError::from(pullapprove_client::Error::ServerError { status: 500 }).kind(),
        ErrorKind::ServerError
    );
}

#[test]
fn test_configuration_error_kind() {
    let error = ProvisionerError::from(ConfigurationError::RequiredConfigMissing {
        key: "github.token".to_string(),
    });

    assert_eq!(error.kind(), ErrorKind::Configuration);
}

#[test]
fn test_context_keeps_kind_and_source() {
    let error = ProvisionerError::from(github_client::Error::NotFound(
        "Repository acme/gone".to_string(),
    ))
    .context("Could not fetch repository acme/gone");

    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(error.to_string(), "Could not fetch repository acme/gone");
    assert_eq!(
        error.source().map(|s| s.to_string()),
        Some("Repository acme/gone was not found".to_string())
    );
}

#[test]
fn test_already_applied_kinds() {
    assert!(ErrorKind::AlreadyExists.is_already_applied());
    assert!(ErrorKind::AlreadyEnabled.is_already_applied());
    assert!(ErrorKind::AlreadyNotEnabled.is_already_applied());
    assert!(!ErrorKind::NotFound.is_already_applied());
    assert!(!ErrorKind::RemoteError.is_already_applied());
}

#[test]
fn test_aggregate_collects_failures() {
    let mut aggregate = AggregateError::new();
    aggregate.attempt();
    aggregate.attempt();
    aggregate.push(
        1,
        "team 42",
        github_client::Error::RemoteError("reset".to_string()).into(),
    );
    aggregate.attempt();

    assert!(aggregate.has_failures());
    assert_eq!(aggregate.attempted(), 3);
    assert_eq!(aggregate.failures()[0].index, 1);
    assert_eq!(
        aggregate.to_string(),
        "1 of 3 item(s) failed; team 42: Request to GitHub failed: reset"
    );
}

#[test]
fn test_aggregate_partition_and_kind() {
    let mut aggregate = AggregateError::new();
    aggregate.attempt();
    aggregate.push(
        0,
        "label 'bug'",
        github_client::Error::AlreadyExists("Label 'bug'".to_string()).into(),
    );
    aggregate.attempt();
    aggregate.push(
        1,
        "label 'x'",
        github_client::Error::ServerError {
            status: 500,
            message: "boom".to_string(),
        }
        .into(),
    );

    let (absorbed, failed) = aggregate.partition(|f| f.error.kind().is_already_applied());

    assert_eq!(absorbed.failures().len(), 1);
    assert_eq!(failed.failures().len(), 1);
    assert_eq!(failed.attempted(), 2);

    let error = failed.into_result().unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ServerError);
}

#[test]
fn test_empty_aggregate_is_ok() {
    let mut aggregate = AggregateError::new();
    aggregate.attempt();

    assert!(aggregate.into_result().is_ok());
}
