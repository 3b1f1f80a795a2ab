//! Self-update from the tool's own GitHub releases.
//!
//! The latest release is compared with the compiled version by tag. When they
//! differ, the asset built for this platform (`*_<os>_<arch>*`) is downloaded
//! and written over the running executable.

use std::{io::Write, path::Path, time::Duration};

use clap::Args;
use github_client::{create_token_client, GitHubClient};
use octocrab::Octocrab;
use secrecy::ExposeSecret;
use tracing::{debug, info, instrument};
use url::Url;

use crate::commands::{load_configuration, GlobalArgs};
use crate::errors::Error;

#[cfg(test)]
#[path = "update_cmd_tests.rs"]
mod tests;

/// Owner of the repository the tool is released from.
pub const RELEASE_OWNER: &str = "pvandervelde";

/// Repository the tool is released from.
pub const RELEASE_REPOSITORY: &str = "RepoProvisioner";

/// Arguments of `update`.
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Request timeout when looking for a new release, e.g. `10s`, `500ms` or `1m`
    #[arg(long, default_value = "10s", value_parser = parse_duration)]
    pub timeout: Duration,
}

/// The version compiled into the binary.
pub fn version() -> &'static str {
    option_env!("REPO_PROVISIONER_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Parses a duration made of a number and an optional `ms`, `s`, `m` or `h`
/// unit. A bare number is read as seconds.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (amount, unit) = value.split_at(split);
    let amount: u64 = amount
        .parse()
        .map_err(|_| format!("invalid duration '{value}'"))?;

    match unit {
        "ms" => Ok(Duration::from_millis(amount)),
        "" | "s" => Ok(Duration::from_secs(amount)),
        "m" => Ok(Duration::from_secs(amount.saturating_mul(60))),
        "h" => Ok(Duration::from_secs(amount.saturating_mul(3600))),
        _ => Err(format!("invalid duration unit '{unit}' in '{value}'")),
    }
}

/// The asset name fragment for a platform, in the `_<os>_<arch>` form the
/// release pipeline uses.
pub fn release_platform(os: &str, arch: &str) -> String {
    let os = match os {
        "macos" => "darwin",
        other => other,
    };
    let arch = match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    };
    format!("_{os}_{arch}")
}

/// Whether `tag` names a different version than `current`.
///
/// A leading `v` on either side is ignored.
pub fn is_different_version(tag: &str, current: &str) -> bool {
    tag.trim_start_matches('v') != current.trim_start_matches('v')
}

/// Executes the update command.
#[instrument(skip(global))]
pub async fn execute(args: &UpdateArgs, global: &GlobalArgs) -> Result<(), Error> {
    let config = load_configuration(global)?;
    let octocrab = match &config.github.token {
        Some(token) => create_token_client(token.expose_secret()).map_err(Error::GitHubClient)?,
        None => Octocrab::builder().build().map_err(|e| {
            Error::GitHubClient(github_client::Error::AuthError(e.to_string()))
        })?,
    };
    let github = GitHubClient::new(octocrab);

    info!("Checking if any new version is available...");
    let release = tokio::time::timeout(
        args.timeout,
        github.get_latest_release(RELEASE_OWNER, RELEASE_REPOSITORY),
    )
    .await
    .map_err(|_| Error::Timeout(args.timeout))?
    .map_err(Error::Release)?;

    if !is_different_version(&release.tag_name, version()) {
        println!(
            "You already have the latest version of {RELEASE_OWNER}/{RELEASE_REPOSITORY}"
        );
        return Ok(());
    }

    let platform = release_platform(std::env::consts::OS, std::env::consts::ARCH);
    let asset = release
        .find_asset(&platform)
        .ok_or_else(|| Error::NoMatchingAsset {
            tag: release.tag_name.clone(),
            platform: platform.clone(),
        })?;
    debug!(asset = %asset.name, "Selected release asset");

    let binary = download(&asset.browser_download_url, args.timeout).await?;
    let current = std::env::current_exe().map_err(Error::ReplaceExecutable)?;
    install(&current, &binary)?;

    println!("Updated to the version {}", release.tag_name);
    Ok(())
}

/// Downloads a release asset.
pub async fn download(url: &Url, timeout: Duration) -> Result<Vec<u8>, Error> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("repo-provisioner/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(Error::Download)?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(Error::Download)?;
    let bytes = response.bytes().await.map_err(Error::Download)?;
    Ok(bytes.to_vec())
}

/// Replaces `target` with `binary`.
///
/// The new file is written next to the target and renamed over it.
pub fn install(target: &Path, binary: &[u8]) -> Result<(), Error> {
    let directory = target.parent().unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(directory).map_err(Error::ReplaceExecutable)?;
    file.write_all(binary).map_err(Error::ReplaceExecutable)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o755))
            .map_err(Error::ReplaceExecutable)?;
    }

    file.persist(target)
        .map_err(|e| Error::ReplaceExecutable(e.error))?;
    Ok(())
}
