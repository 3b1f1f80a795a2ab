use super::*;
use clap::Parser;

#[derive(Parser, Debug)]
struct TestCli {
    #[command(subcommand)]
    command: HiringCommands,
}

fn parse(args: &[&str]) -> Result<HiringCommands, clap::Error> {
    TestCli::try_parse_from(std::iter::once(&"hiring").chain(args.iter())).map(|c| c.command)
}

#[test]
fn test_send_with_branch() {
    match parse(&["send", "octocat", "backend-test", "solution"]).unwrap() {
        HiringCommands::Send(args) => {
            assert_eq!(args.username, "octocat");
            assert_eq!(args.repo, "backend-test");
            assert_eq!(args.branch.as_deref(), Some("solution"));
        }
        other => panic!("expected send, got {other:?}"),
    }
}

#[test]
fn test_send_branch_is_optional() {
    match parse(&["send", "octocat", "backend-test"]).unwrap() {
        HiringCommands::Send(args) => assert_eq!(args.branch, None),
        other => panic!("expected send, got {other:?}"),
    }
}

#[test]
fn test_send_requires_repository() {
    assert!(parse(&["send", "octocat"]).is_err());
}

#[test]
fn test_unseat_defaults() {
    match parse(&["unseat"]).unwrap() {
        HiringCommands::Unseat(args) => {
            assert_eq!(args.page_size, 50);
            assert_eq!(args.page, 1);
            assert_eq!(
                args.options(5),
                SweepOptions {
                    page_size: 50,
                    start_page: 1,
                    inactivity_weeks: 5,
                }
            );
        }
        other => panic!("expected unseat, got {other:?}"),
    }
}

#[test]
fn test_unseat_paging_flags() {
    match parse(&["unseat", "--page-size", "100", "--page", "3"]).unwrap() {
        HiringCommands::Unseat(args) => {
            let options = args.options(8);
            assert_eq!(options.page_size, 100);
            assert_eq!(options.start_page, 3);
            assert_eq!(options.inactivity_weeks, 8);
        }
        other => panic!("expected unseat, got {other:?}"),
    }
}

#[test]
fn test_unseat_rejects_page_size_over_limit() {
    assert!(parse(&["unseat", "--page-size", "101"]).is_err());
    assert!(parse(&["unseat", "--page-size", "0"]).is_err());
    assert!(parse(&["unseat", "--page", "0"]).is_err());
}

#[test]
fn test_unseat_summary() {
    let summary = SweepSummary {
        repositories_fetched: 12,
        repositories_skipped: 4,
        collaborators_removed: 7,
    };

    assert_eq!(
        unseat_summary(&summary),
        "12 repositories fetched, 4 skipped as inactive, 7 collaborators removed"
    );
}
