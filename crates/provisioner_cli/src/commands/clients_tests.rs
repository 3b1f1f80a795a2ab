use super::*;
use provisioner_core::RuleToggles;

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.github.organization = "acme".to_string();
    config.github.token = Some(SecretString::from("ghp_test".to_string()));
    config
}

fn config_error(result: Result<ProvisionContext, Error>) -> ConfigurationError {
    match result {
        Err(Error::Config(e)) => e,
        Err(other) => panic!("expected a configuration error, got {other:?}"),
        Ok(_) => panic!("expected a configuration error, got a context"),
    }
}

#[tokio::test]
async fn test_provision_context_with_defaults_has_only_github() {
    let config = config();
    let rules = RuleSet::from_config(&config, &RuleToggles::default());

    let ctx = provision_context(&config, &rules).unwrap();

    assert!(ctx.approval_policy.is_none());
    assert!(ctx.merge_check.is_none());
}

#[tokio::test]
async fn test_provision_context_requires_github_token() {
    let mut config = config();
    config.github.token = None;
    let rules = RuleSet::from_config(&config, &RuleToggles::default());

    let error = config_error(provision_context(&config, &rules));

    assert_eq!(
        error,
        ConfigurationError::RequiredConfigMissing {
            key: "github.token".to_string()
        }
    );
}

#[tokio::test]
async fn test_provision_context_pullapprove_without_token() {
    let config = config();
    let toggles = RuleToggles {
        pullapprove: true,
        ..RuleToggles::default()
    };
    let rules = RuleSet::from_config(&config, &toggles);

    let error = config_error(provision_context(&config, &rules));

    assert_eq!(
        error,
        ConfigurationError::RequiredConfigMissing {
            key: "pullapprove.token".to_string()
        }
    );
}

#[tokio::test]
async fn test_provision_context_merge_check_without_url() {
    let config = config();
    let toggles = RuleToggles {
        merge_check: true,
        ..RuleToggles::default()
    };
    let rules = RuleSet::from_config(&config, &toggles);

    let error = config_error(provision_context(&config, &rules));

    assert_eq!(
        error,
        ConfigurationError::RequiredConfigMissing {
            key: "merge_check.url".to_string()
        }
    );
}

#[tokio::test]
async fn test_provision_context_builds_configured_services() {
    let mut config = config();
    config.pullapprove.token = Some(SecretString::from("pa_test".to_string()));
    config.merge_check.url = "https://zappr.example.com".to_string();
    let toggles = RuleToggles {
        pullapprove: true,
        merge_check: true,
        ..RuleToggles::default()
    };
    let rules = RuleSet::from_config(&config, &toggles);

    let ctx = provision_context(&config, &rules).unwrap();

    assert!(ctx.approval_policy.is_some());
    assert!(ctx.merge_check.is_some());
}

#[tokio::test]
async fn test_merge_check_rejects_invalid_url() {
    let mut config = config();
    config.merge_check.url = "not a url".to_string();

    let error = merge_check(&config).unwrap_err();

    assert!(matches!(
        error,
        Error::MergeCheckClient(merge_check_client::Error::InvalidUrl(_))
    ));
}

#[tokio::test]
async fn test_decommission_context_without_merge_check_url() {
    let ctx = decommission_context(&config()).unwrap();

    assert!(ctx.merge_check.is_none());
}
