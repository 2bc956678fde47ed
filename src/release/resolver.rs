//! Release resolution
//!
//! Maps an optional version constraint to one concrete release. Authors tag releases both
//! as `v1.2.3` and `1.2.3`, so exact lookups try the prefixed tag first.

use semver::Version;
use tracing::debug;

use super::{Release, ReleaseDirectory};
use crate::error::{CorralError, Result, release};
use crate::specifier::parse_lenient;

/// Resolve `owner/repo` to a release
///
/// Without a version this is whatever the host reports as latest, which can be a pre-release.
pub fn resolve(
    directory: &dyn ReleaseDirectory,
    owner: &str,
    repo: &str,
    version: Option<&Version>,
) -> Result<Release> {
    let Some(version) = version else {
        debug!("Resolving latest release of {owner}/{repo}");
        return directory.latest_release(owner, repo);
    };

    let prefixed = format!("v{version}");
    debug!("Resolving release {prefixed} of {owner}/{repo}");
    match directory.release_by_tag(owner, repo, &prefixed) {
        Ok(release) => Ok(release),
        Err(CorralError::ReleaseNotFound { .. }) => {
            let bare = version.to_string();
            debug!("Tag {prefixed} not found, retrying with {bare}");
            directory.release_by_tag(owner, repo, &bare)
        }
        Err(e) => Err(e),
    }
}

/// Resolve the highest stable release of `owner/repo`
///
/// Tags that do not parse as a version are skipped, as are pre-releases, whether the host
/// flags them or the tag carries a pre-release component.
pub fn latest_stable(
    directory: &dyn ReleaseDirectory,
    owner: &str,
    repo: &str,
) -> Result<(Release, Version)> {
    directory
        .list_releases(owner, repo)?
        .into_iter()
        .filter(|release| !release.prerelease)
        .filter_map(|release| {
            let version = parse_lenient(&release.tag_name)?;
            version.pre.is_empty().then_some((release, version))
        })
        .max_by(|(_, a), (_, b)| a.cmp(b))
        .ok_or_else(|| release::not_found(format!("{owner}/{repo}"), "latest stable"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::fake::FakeReleaseDirectory;

    fn directory_with(tags: &[&str]) -> FakeReleaseDirectory {
        let directory = FakeReleaseDirectory::new();
        for tag in tags {
            directory.add_release("owner", "repo", tag, Vec::new());
        }
        directory
    }

    #[test]
    fn test_resolve_latest_passes_through_prerelease() {
        let directory = directory_with(&["v1.0.0", "v2.0.0-rc.1"]);
        let release = resolve(&directory, "owner", "repo", None).unwrap();
        assert_eq!(release.tag_name, "v2.0.0-rc.1");
    }

    #[test]
    fn test_resolve_prefers_prefixed_tag() {
        let directory = directory_with(&["1.0.0", "v1.0.0"]);
        let release = resolve(&directory, "owner", "repo", Some(&Version::new(1, 0, 0))).unwrap();
        assert_eq!(release.tag_name, "v1.0.0");
    }

    #[test]
    fn test_resolve_falls_back_to_bare_tag() {
        let directory = directory_with(&["1.2.0"]);
        let release = resolve(&directory, "owner", "repo", Some(&Version::new(1, 2, 0))).unwrap();
        assert_eq!(release.tag_name, "1.2.0");
    }

    #[test]
    fn test_resolve_missing_version() {
        let directory = directory_with(&["v1.0.0"]);
        let result = resolve(&directory, "owner", "repo", Some(&Version::new(3, 0, 0)));
        assert!(matches!(result, Err(CorralError::ReleaseNotFound { .. })));
    }

    #[test]
    fn test_latest_stable_skips_prereleases_and_unparseable_tags() {
        let directory = directory_with(&["v1.0.0", "nightly", "v1.10.0", "v1.9.0", "v2.0.0-beta.1"]);
        let (release, version) = latest_stable(&directory, "owner", "repo").unwrap();
        assert_eq!(release.tag_name, "v1.10.0");
        assert_eq!(version, Version::new(1, 10, 0));
    }

    #[test]
    fn test_latest_stable_without_stable_release() {
        let directory = directory_with(&["v1.0.0-alpha", "snapshot"]);
        assert!(matches!(
            latest_stable(&directory, "owner", "repo"),
            Err(CorralError::ReleaseNotFound { .. })
        ));
    }

    #[test]
    fn test_latest_stable_skips_releases_flagged_as_prerelease() {
        let directory = directory_with(&["v1.0.0", "v1.1.0"]);
        directory.mark_prerelease("owner", "repo", "v1.1.0");

        let (release, _) = latest_stable(&directory, "owner", "repo").unwrap();

        assert_eq!(release.tag_name, "v1.0.0");
    }
}
