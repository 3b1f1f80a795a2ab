use super::*;

#[test]
fn test_cli_parses_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "repo-provisioner",
        "repo",
        "create",
        "acme-service",
        "--organization=acme",
        "--has-teams=true",
        "--has-labels=true",
        "--verbose",
    ])
    .unwrap();

    assert_eq!(cli.global.organization.as_deref(), Some("acme"));
    assert!(cli.global.verbose);
    match cli.command {
        Commands::Repo(RepoCommands::Create(args)) => {
            assert_eq!(args.name, "acme-service");
            assert!(args.has_teams);
            assert!(args.has_labels);
        }
        other => panic!("expected repo create, got {other:?}"),
    }
}

#[test]
fn test_cli_parses_config_and_token_before_subcommand() {
    let cli = Cli::try_parse_from([
        "repo-provisioner",
        "--config",
        "/etc/provisioner/.github.toml",
        "--token",
        "ghp_flag",
        "hiring",
        "unseat",
    ])
    .unwrap();

    assert_eq!(
        cli.global.config.as_deref(),
        Some(std::path::Path::new("/etc/provisioner/.github.toml"))
    );
    assert_eq!(cli.global.token.as_deref(), Some("ghp_flag"));
    assert!(matches!(
        cli.command,
        Commands::Hiring(HiringCommands::Unseat(_))
    ));
}

#[test]
fn test_cli_update_alias() {
    let cli = Cli::try_parse_from(["repo-provisioner", "self-update"]).unwrap();

    assert!(matches!(cli.command, Commands::Update(_)));
}

#[test]
fn test_cli_version() {
    let cli = Cli::try_parse_from(["repo-provisioner", "version"]).unwrap();

    assert!(matches!(cli.command, Commands::Version));
    assert!(!cli.global.verbose);
}

#[test]
fn test_cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["repo-provisioner"]).is_err());
}

#[tokio::test]
async fn test_run_version_succeeds() {
    let cli = Cli::try_parse_from(["repo-provisioner", "version"]).unwrap();

    assert!(run(&cli).await.is_ok());
}
