use std::{io, time::Duration};

use config_manager::ConfigurationError;
use provisioner_core::ProvisionerError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the repository provisioner CLI.
///
/// Workflow failures are passed through unchanged so the printed chain
/// carries the context each layer attached.
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration is incomplete or invalid for the requested command.
    ///
    /// Raised before any network call is made.
    #[error("Invalid configuration")]
    Config(#[from] ConfigurationError),

    /// The GitHub client could not be built.
    #[error("Could not create the GitHub client")]
    GitHubClient(#[source] github_client::Error),

    /// The PullApprove client could not be built.
    #[error("Could not create the PullApprove client")]
    PullApproveClient(#[source] pullapprove_client::Error),

    /// The merge-check client could not be built.
    #[error("Could not create the merge-check client")]
    MergeCheckClient(#[source] merge_check_client::Error),

    /// A provisioning workflow failed.
    #[error(transparent)]
    Provisioning(#[from] ProvisionerError),

    /// The latest release of the tool could not be retrieved.
    #[error("Could not retrieve the latest release")]
    Release(#[source] github_client::Error),

    /// The release feed did not answer in time.
    #[error("Timed out after {0:?} while looking for a new release")]
    Timeout(Duration),

    /// The latest release has no binary for this platform.
    #[error("Release {tag} has no asset matching '{platform}'")]
    NoMatchingAsset { tag: String, platform: String },

    /// Downloading the release binary failed.
    #[error("Could not download the release asset")]
    Download(#[source] reqwest::Error),

    /// The downloaded binary could not be installed.
    #[error("Could not replace the running executable")]
    ReplaceExecutable(#[source] io::Error),
}

/// Renders an error followed by each of its causes, separated by `: `.
pub fn render_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
