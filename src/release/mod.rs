//! Remote releases
//!
//! - [`ReleaseDirectory`]: the contract for listing and downloading release assets
//! - [`github`]: implementation over the GitHub REST API
//! - [`resolver`]: turns an optional version constraint into one concrete release

pub mod github;
pub mod resolver;

use std::io::Read;

use serde::Deserialize;

use crate::error::Result;

pub use github::GithubReleaseDirectory;

/// One downloadable file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub content_type: String,
}

/// A tagged publication on the release host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// Source of releases and their assets for a repository
pub trait ReleaseDirectory {
    /// The release the host reports as latest (may be a pre-release)
    fn latest_release(&self, owner: &str, repo: &str) -> Result<Release>;

    /// The release with exactly this tag
    fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Release>;

    /// Every release of the repository
    fn list_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>>;

    /// Stream the content of an asset
    ///
    /// The second value is the content length when the host reports one.
    fn download_asset(
        &self,
        owner: &str,
        repo: &str,
        asset_id: u64,
    ) -> Result<(Box<dyn Read>, Option<u64>)>;
}
