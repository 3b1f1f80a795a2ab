//! # Models
//!
//! Data models for the GitHub resources this tool reads back: repository
//! collaborators and releases of the tool itself.

use serde::{Deserialize, Serialize};
use url::Url;

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// A user with access to a repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Collaborator {
    /// The unique ID of the user
    pub id: u64,
    /// The login name of the user
    pub login: String,
}

/// A published release.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Release {
    /// The git tag of the release, e.g. `v1.2.0`
    pub tag_name: String,
    /// The display name of the release
    pub name: Option<String>,
    /// The binaries attached to the release
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Finds the first asset whose name contains `fragment`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use github_client::models::{Release, ReleaseAsset};
    ///
    /// let release = Release {
    ///     tag_name: "v1.0.0".to_string(),
    ///     name: None,
    ///     assets: vec![ReleaseAsset {
    ///         name: "tool_linux_amd64".to_string(),
    ///         browser_download_url: "https://example.com/tool_linux_amd64".parse().unwrap(),
    ///         size: 10,
    ///     }],
    /// };
    ///
    /// assert!(release.find_asset("_linux_amd64").is_some());
    /// assert!(release.find_asset("_darwin_arm64").is_none());
    /// ```
    pub fn find_asset(&self, fragment: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|a| a.name.contains(fragment))
    }
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReleaseAsset {
    /// The file name of the asset
    pub name: String,
    /// The public download URL
    pub browser_download_url: Url,
    /// The asset size in bytes
    #[serde(default)]
    pub size: u64,
}
