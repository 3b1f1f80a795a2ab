use super::*;

const FULL_CONFIG: &str = r#"
[github]
organization = "acme"
token = "ghp_file"
remove_default_labels = true

[[github.teams]]
id = 1234
permission = "push"

[[github.teams]]
id = 5678
permission = "admin"

[[github.collaborators]]
username = "octocat"
permission = "pull"

[[github.labels]]
name = "needs-review"
color = "fbca04"

[[github.webhooks]]
type = "web"
events = ["push", "pull_request"]

[github.webhooks.config]
url = "https://ci.acme.example/hook"
content_type = "json"

[github.protections]
master = ["ci/build", "ci/test"]

[pullapprove]
token = "pa-token"

[merge_check]
url = "https://zappr.acme.example"
use_app_credentials = false

[hiring]
organization = "acme-hiring"
inactivity_weeks = 8
"#;

fn parse(content: &str) -> AppConfig {
    toml::from_str(content).expect("valid configuration")
}

#[test]
fn test_full_configuration_parses() {
    let config = parse(FULL_CONFIG);

    assert_eq!(config.github.organization, "acme");
    assert!(config.github.remove_default_labels);
    assert_eq!(config.github.teams.len(), 2);
    assert_eq!(config.github.teams[1].id, 5678);
    assert_eq!(config.github.collaborators[0].username, "octocat");
    assert_eq!(config.github.labels[0].color, "fbca04");
    assert_eq!(config.github.webhooks[0].hook_type, "web");
    assert!(config.github.webhooks[0].active);
    assert_eq!(
        config.github.webhooks[0].config["content_type"],
        serde_json::json!("json")
    );
    assert_eq!(
        config.github.protections["master"],
        vec!["ci/build".to_string(), "ci/test".to_string()]
    );
    assert_eq!(
        config.pullapprove.require_token().unwrap().expose_secret(),
        "pa-token"
    );
    assert!(!config.merge_check.use_app_credentials);
    assert_eq!(config.hiring.inactivity_weeks, 8);
    assert!(config.github.validate().is_ok());
}

#[test]
fn test_empty_configuration_uses_defaults() {
    let config = parse("");

    assert_eq!(config.pullapprove.filename, ".pullapprove.yml");
    assert_eq!(config.pullapprove.protected_branch_name, "master");
    assert_eq!(config.pullapprove.url, "https://pullapprove.com/api/");
    assert!(config.merge_check.use_app_credentials);
    assert_eq!(config.merge_check.timeout_seconds, 30);
    assert!(!config.merge_check.is_configured());
    assert_eq!(config.hiring.inactivity_weeks, 5);
    assert!(config.github.teams.is_empty());
}

#[test]
fn test_token_default_fills_empty_tokens_only() {
    let mut config = parse(FULL_CONFIG);

    config.apply_token_default(Some("ghp_env"));

    assert_eq!(
        config.github.require_token().unwrap().expose_secret(),
        "ghp_file"
    );
    assert_eq!(
        config.hiring.require_token().unwrap().expose_secret(),
        "ghp_env"
    );
}

#[test]
fn test_token_default_ignores_empty_value() {
    let mut config = parse("");

    config.apply_token_default(Some(""));

    assert!(config.github.token.is_none());
    assert!(config.hiring.token.is_none());
}

#[test]
fn test_overrides_take_precedence() {
    let mut config = parse(FULL_CONFIG);

    config.apply_overrides(Some("ghp_flag"), Some("other-org"));

    assert_eq!(config.github.organization, "other-org");
    assert_eq!(
        config.github.require_token().unwrap().expose_secret(),
        "ghp_flag"
    );
}

#[test]
fn test_token_override_replaces_the_hiring_token() {
    let mut config = parse(FULL_CONFIG);
    config.hiring.token = Some(SecretString::from("ghp_hiring".to_string()));

    config.apply_overrides(Some("ghp_flag"), None);

    assert_eq!(
        config.hiring.require_token().unwrap().expose_secret(),
        "ghp_flag"
    );
    assert_eq!(config.hiring.organization, "acme-hiring");
}

#[test]
fn test_validate_requires_organization() {
    let config = parse("[github]\ntoken = \"t\"\n");

    assert_eq!(
        config.github.validate(),
        Err(ConfigurationError::RequiredConfigMissing {
            key: "github.organization".to_string()
        })
    );
}

#[test]
fn test_validate_requires_token() {
    let config = parse("[github]\norganization = \"acme\"\ntoken = \"  \"\n");

    assert_eq!(
        config.github.validate(),
        Err(ConfigurationError::RequiredConfigMissing {
            key: "github.token".to_string()
        })
    );
}

#[test]
fn test_validate_rejects_unknown_permission() {
    let config = parse(
        r#"
[github]
organization = "acme"
token = "t"

[[github.teams]]
id = 1
permission = "write"
"#,
    );

    match config.github.validate() {
        Err(ConfigurationError::InvalidConfiguration { field, .. }) => {
            assert_eq!(field, "github.teams[0].permission")
        }
        other => panic!("expected InvalidConfiguration, got {other:?}"),
    }
}

#[test]
fn test_validate_rejects_bad_label_color() {
    let config = parse(
        r##"
[github]
organization = "acme"
token = "t"

[[github.labels]]
name = "bug"
color = "#d73a4a"
"##,
    );

    assert!(matches!(
        config.github.validate(),
        Err(ConfigurationError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_pullapprove_validate_requires_token() {
    let config = parse("");

    assert_eq!(
        config.pullapprove.validate(),
        Err(ConfigurationError::RequiredConfigMissing {
            key: "pullapprove.token".to_string()
        })
    );
}

#[test]
fn test_merge_check_validate_requires_url() {
    let config = parse("[merge_check]\nuse_app_credentials = true\n");

    assert_eq!(
        config.merge_check.validate(),
        Err(ConfigurationError::RequiredConfigMissing {
            key: "merge_check.url".to_string()
        })
    );
}

#[test]
fn test_hiring_validate() {
    let mut config = parse("[hiring]\norganization = \"acme-hiring\"\n");
    assert!(config.hiring.validate().is_err());

    config.apply_token_default(Some("ghp_env"));

    assert!(config.hiring.validate().is_ok());
}

#[test]
fn test_type_mismatch_is_rejected() {
    let result = toml::from_str::<AppConfig>("[github]\nteams = \"not a list\"\n");

    assert!(result.is_err());
}

#[test]
fn test_distributed_example_parses_and_validates() {
    let mut config = parse(include_str!("../../../.github.toml.dist"));
    config.apply_token_default(Some("ghp_env"));

    assert_eq!(config.github.organization, "acme");
    assert_eq!(config.github.labels.len(), 2);
    assert_eq!(config.github.webhooks[0].config["content_type"], "json");
    assert_eq!(config.hiring.organization, "acme-hiring");
    assert!(!config.merge_check.is_configured());
    config.github.validate().unwrap();
    config.hiring.validate().unwrap();
}
