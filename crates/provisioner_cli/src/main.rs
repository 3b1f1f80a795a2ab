use clap::{Parser, Subcommand};
use provisioner_cli::commands::{
    hiring_cmd::{self, HiringCommands},
    repo_cmd::{self, RepoCommands},
    update_cmd::{self, UpdateArgs},
    GlobalArgs,
};
use provisioner_cli::errors::{render_chain, Error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// Environment variable holding the log filter, e.g. `provisioner_core=debug`
const LOG_ENV_VAR: &str = "REPO_PROVISIONER_LOG";

/// Repository provisioner: create and normalize GitHub repositories
#[derive(Parser, Debug)]
#[command(name = "repo-provisioner")]
#[command(about = "Create and normalize GitHub repositories following your .github.toml", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage repositories
    #[command(subcommand)]
    Repo(RepoCommands),

    /// Manage hiring tests
    #[command(subcommand)]
    Hiring(HiringCommands),

    /// Check for a new version and install it
    #[command(alias = "self-update")]
    Update(UpdateArgs),

    /// Show the CLI version
    Version,
}

fn log_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

async fn run(cli: &Cli) -> Result<(), Error> {
    match &cli.command {
        Commands::Repo(cmd) => repo_cmd::execute(cmd, &cli.global).await,
        Commands::Hiring(cmd) => hiring_cmd::execute(cmd, &cli.global).await,
        Commands::Update(args) => update_cmd::execute(args, &cli.global).await,
        Commands::Version => {
            println!("repo-provisioner version {}", update_cmd::version());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(cli.global.verbose))
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("Error: {}", render_chain(&e));
        std::process::exit(1);
    }
}
