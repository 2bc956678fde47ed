//! Install operation
//!
//! Resolves a release, downloads the archive built for this platform, verifies it when the
//! release is signed, extracts it into `<plugin dir>/<owner>@<repo>` and loads the result.
//! A failure after extraction removes the directory again, so a later scan never sees a
//! half-installed plugin.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

use semver::Version;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::archive::{self, copy_bounded};
use crate::asset::{Platform, select_for_platform};
use crate::config::Settings;
use crate::error::{Result, fs as fs_error, plugin, release, specifier};
use crate::plugin::conflict::Conflict;
use crate::plugin::first_class;
use crate::plugin::signature::SignatureVerifier;
use crate::plugin::{Plugin, Source, ValidatedPlugins};
use crate::progress::DownloadProgress;
use crate::release::resolver;
use crate::release::{Release, ReleaseDirectory};
use crate::specifier::PluginSpecifier;
use crate::temp;

/// Upper bound for signature and public key assets
const MAX_SIGNATURE_ASSET_SIZE: u64 = 1024 * 1024;

/// Which release of a repository to install
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseSelector {
    /// Whatever the host reports as latest
    Latest,
    /// Tag `v<version>`, or `<version>` when that does not exist
    Exact(Version),
    /// Highest release without a pre-release component
    LatestStable,
}

/// Configuration options for install
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub skip_signature_verification: bool,
    pub show_progress: bool,
}

/// Result of a successful install
#[derive(Debug)]
pub struct InstallOutcome {
    pub plugin: Plugin,
    pub tag: String,
    /// Set when the plugin is installed but cannot expose its commands
    pub conflict: Option<Conflict>,
}

/// The repository and release an install specifier refers to
///
/// A bare name is accepted for first-class plugins. Naming an installed plugin is a source
/// conflict.
pub fn install_target(
    target: &PluginSpecifier,
    registry: &ValidatedPlugins,
) -> Result<(Source, ReleaseSelector)> {
    let selector = target
        .version()
        .map_or(ReleaseSelector::Latest, |v| ReleaseSelector::Exact(v.clone()));

    match target {
        PluginSpecifier::Repository { owner, repo, .. } => {
            Ok((Source::new(owner.clone(), repo.clone()), selector))
        }
        PluginSpecifier::Name { name, .. } => {
            if let Some(installed) = registry.all().find(|p| &p.name == name) {
                let repository = installed
                    .source
                    .as_ref()
                    .map_or_else(|| name.clone(), ToString::to_string);
                return Err(plugin::source_conflict(repository));
            }
            first_class::find_by_name(name)
                .map(|first_class| (first_class.source(), selector))
                .ok_or_else(|| {
                    specifier::invalid(
                        target.to_string(),
                        "expected <owner>/<repo>, a repository URL or the name of a first-class plugin",
                    )
                })
        }
    }
}

/// High-level install operation
pub struct InstallOperation<'a> {
    settings: &'a Settings,
    directory: &'a dyn ReleaseDirectory,
    verifier: &'a dyn SignatureVerifier,
    builtin_commands: &'a HashSet<String>,
    platform: Platform,
}

impl<'a> InstallOperation<'a> {
    pub fn new(
        settings: &'a Settings,
        directory: &'a dyn ReleaseDirectory,
        verifier: &'a dyn SignatureVerifier,
        builtin_commands: &'a HashSet<String>,
    ) -> Self {
        Self {
            settings,
            directory,
            verifier,
            builtin_commands,
            platform: Platform::current(),
        }
    }

    /// Install for `platform` instead of the running one
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Install the plugin published by `source`
    ///
    /// Fails with `SourceConflict` before any network access if a plugin from `source` is
    /// already installed or a registered plugin occupies its directory. A plugin whose name or commands clash with installed ones stays on
    /// disk and is reported through [`InstallOutcome::conflict`].
    pub fn execute(
        &self,
        registry: &ValidatedPlugins,
        source: &Source,
        selector: &ReleaseSelector,
        options: &InstallOptions,
    ) -> Result<InstallOutcome> {
        let target = self.settings.plugin_dir.join(source.directory_name());
        registry.check_source_conflict(source, &target)?;
        self.settings.ensure_plugin_dir()?;

        let release = self.resolve(source, selector)?;
        debug!("Resolved {source} to release {}", release.tag_name);

        let asset = select_for_platform(&source.to_string(), &release.assets, &self.platform)?;
        let mut archive = temp::download_file()?;
        self.download(source, asset.asset_id, &asset.name, &mut archive, options.show_progress)?;

        match (asset.signature_asset_id, asset.public_key_asset_id) {
            (Some(_), _) if options.skip_signature_verification => {
                warn!("Skipping signature verification of {}", asset.name);
            }
            (Some(signature_id), Some(public_key_id)) => {
                let signature = self.download_small(source, signature_id)?;
                let public_key = self.download_small(source, public_key_id)?;
                self.verifier
                    .verify(archive.path(), &asset.name, &signature, &public_key)?;
                debug!("Signature of {} verified", asset.name);
            }
            _ => debug!("Release {} of {source} is not signed", release.tag_name),
        }

        remove_stale_directory(&target)?;
        archive::extract(archive.path(), &target)?;

        let plugin = match Plugin::load(&target) {
            Ok(plugin) => plugin,
            Err(e) => {
                remove_partial_directory(&target);
                return Err(e);
            }
        };

        let conflict = registry.conflict_for(&plugin, self.builtin_commands);
        if let Some(conflict) = &conflict {
            warn!(
                "-- plugin warning: {}",
                conflict.clone().into_error(&plugin)
            );
        }

        Ok(InstallOutcome {
            plugin,
            tag: release.tag_name,
            conflict,
        })
    }

    fn resolve(&self, source: &Source, selector: &ReleaseSelector) -> Result<Release> {
        match selector {
            ReleaseSelector::Latest => {
                resolver::resolve(self.directory, &source.owner, &source.repo, None)
            }
            ReleaseSelector::Exact(version) => {
                resolver::resolve(self.directory, &source.owner, &source.repo, Some(version))
            }
            ReleaseSelector::LatestStable => {
                resolver::latest_stable(self.directory, &source.owner, &source.repo)
                    .map(|(release, _)| release)
            }
        }
    }

    fn download(
        &self,
        source: &Source,
        asset_id: u64,
        name: &str,
        file: &mut NamedTempFile,
        show_progress: bool,
    ) -> Result<()> {
        let (reader, length) =
            self.directory
                .download_asset(&source.owner, &source.repo, asset_id)?;
        let progress = if show_progress {
            DownloadProgress::new(name, length)
        } else {
            DownloadProgress::hidden()
        };

        let mut reader = progress.wrap(reader);
        match io::copy(&mut reader, file.as_file_mut()) {
            Ok(bytes) => {
                progress.finish();
                debug!("Downloaded {name} ({bytes} bytes)");
                Ok(())
            }
            Err(e) => {
                progress.abandon();
                Err(release::download_failed(
                    source.to_string(),
                    asset_id,
                    e.to_string(),
                ))
            }
        }
    }

    fn download_small(&self, source: &Source, asset_id: u64) -> Result<Vec<u8>> {
        let (mut reader, _) =
            self.directory
                .download_asset(&source.owner, &source.repo, asset_id)?;
        let mut content = Vec::new();
        copy_bounded(
            &mut reader,
            &mut content,
            &format!("asset {asset_id}"),
            MAX_SIGNATURE_ASSET_SIZE,
        )?;
        Ok(content)
    }
}

/// Remove a leftover directory that no registered plugin claims
fn remove_stale_directory(target: &Path) -> Result<()> {
    if !target.exists() {
        return Ok(());
    }
    warn!(
        "-- plugin warning: removing stale plugin directory \"{}\"",
        target.display()
    );
    fs::remove_dir_all(target)
        .map_err(|e| fs_error::write_failed(target.display().to_string(), e.to_string()))
}

fn remove_partial_directory(target: &Path) {
    debug!("Removing {}", target.display());
    if let Err(e) = fs::remove_dir_all(target) {
        warn!("Failed to remove {}: {e}", target.display());
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{DEMO_MANIFEST, asset, demo_directory};
    use super::*;
    use crate::archive::fixtures::tar_gz;
    use crate::config::DEFAULT_GITHUB_API_URL;
    use crate::error::CorralError;
    use crate::plugin::fixtures::write_plugin;
    use crate::plugin::signature::Ed25519Verifier;
    use crate::release::fake::FakeReleaseDirectory;
    use crate::plugin::signature::fixtures::{public_key, sign, signing_key};
    use ed25519_dalek::SigningKey;
    use sha2::{Digest, Sha256};
    use tempfile::TempDir;

    fn settings(temp: &TempDir) -> Settings {
        Settings {
            plugin_dir: temp.path().join("plugins"),
            extra_plugin_dir: None,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            github_token: None,
        }
    }

    fn builtin() -> HashSet<String> {
        ["plugin", "help"].iter().map(|s| (*s).to_string()).collect()
    }

    fn install_with(
        settings: &Settings,
        directory: &dyn ReleaseDirectory,
        registry: &ValidatedPlugins,
        selector: &ReleaseSelector,
        options: &InstallOptions,
    ) -> Result<InstallOutcome> {
        let builtin = builtin();
        InstallOperation::new(settings, directory, &Ed25519Verifier, &builtin)
            .with_platform(Platform::new("linux", "amd64"))
            .execute(registry, &Source::new("owner1", "repo1"), selector, options)
    }

    fn install(
        settings: &Settings,
        directory: &dyn ReleaseDirectory,
        registry: &ValidatedPlugins,
    ) -> Result<InstallOutcome> {
        install_with(
            settings,
            directory,
            registry,
            &ReleaseSelector::Latest,
            &InstallOptions::default(),
        )
    }

    /// Adds `v1.1.0` with the demo archive, `signature` and the public key of `key`
    fn signed_directory(signature: &str, key: &SigningKey) -> FakeReleaseDirectory {
        let directory = demo_directory(DEMO_MANIFEST);
        directory.add_release(
            "owner1",
            "repo1",
            "v1.1.0",
            vec![
                asset(1, "plugin_linux_amd64.tar.gz", "application/gzip"),
                asset(2, "plugin_linux_amd64.tar.gz.sig", "text/plain"),
                asset(3, "signing.pub", "application/octet-stream"),
            ],
        );
        directory.add_content(2, signature.as_bytes().to_vec());
        directory.add_content(3, public_key(key).into_bytes());
        directory
    }

    fn demo_archive() -> Vec<u8> {
        tar_gz(&[
            ("manifest.yml", DEMO_MANIFEST.as_bytes(), 0o644),
            ("demo", b"#!/bin/sh\nexit 0\n", 0o755),
        ])
    }

    #[test]
    fn test_install_end_to_end() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let directory = demo_directory(DEMO_MANIFEST);

        let outcome = install(&settings, &directory, &ValidatedPlugins::default()).unwrap();

        assert_eq!(outcome.plugin.name, "demo");
        assert_eq!(outcome.tag, "v1.0.0");
        assert!(outcome.conflict.is_none());
        assert!(
            settings
                .plugin_dir
                .join("owner1@repo1")
                .join("manifest.yml")
                .is_file()
        );

        let registry = ValidatedPlugins::scan(&settings.plugin_roots(), &builtin());
        assert_eq!(registry.valid.len(), 1);
        assert_eq!(
            registry.valid[0].source,
            Some(Source::new("owner1", "repo1"))
        );

        let mut out = Vec::new();
        crate::operations::list::render(&registry, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("demo"));
    }

    #[test]
    fn test_install_twice_is_a_source_conflict_without_download() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let directory = demo_directory(DEMO_MANIFEST);
        install(&settings, &directory, &ValidatedPlugins::default()).unwrap();
        assert_eq!(directory.downloads(), 1);

        let registry = ValidatedPlugins::scan(&settings.plugin_roots(), &builtin());
        let result = install(&settings, &directory, &registry);

        assert!(matches!(result, Err(CorralError::SourceConflict { .. })));
        assert_eq!(directory.downloads(), 1);
    }

    #[test]
    fn test_install_into_directory_of_plugin_with_other_source_is_a_conflict() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let forked = DEMO_MANIFEST.replace(
            "version: 1.0.0\n",
            "version: 1.0.0\ngithub:\n  owner: upstream\n  name: demo\n",
        );
        let directory = demo_directory(&forked);
        install(&settings, &directory, &ValidatedPlugins::default()).unwrap();

        let registry = ValidatedPlugins::scan(&settings.plugin_roots(), &builtin());
        let installed = settings.plugin_dir.join("owner1@repo1");
        assert_eq!(
            registry.valid[0].source,
            Some(Source::new("upstream", "demo"))
        );
        let result = install(&settings, &directory, &registry);

        assert!(matches!(result, Err(CorralError::SourceConflict { .. })));
        assert_eq!(directory.downloads(), 1);
        assert!(installed.join("demo").is_file());
        assert!(installed.join("manifest.yml").is_file());
    }

    #[test]
    fn test_invalid_manifest_removes_directory() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let directory =
            demo_directory("name: demo\nbinary: demo\nversion: nope\ncommands: {}\n");

        let result = install(&settings, &directory, &ValidatedPlugins::default());

        match result {
            Err(CorralError::ManifestInvalid { errors, .. }) => assert_eq!(errors.len(), 3),
            other => panic!("Expected ManifestInvalid, got {other:?}"),
        }
        assert!(!settings.plugin_dir.join("owner1@repo1").exists());
    }

    #[test]
    fn test_missing_binary_removes_directory() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let directory = demo_directory(&DEMO_MANIFEST.replace("binary: demo", "binary: other"));

        let result = install(&settings, &directory, &ValidatedPlugins::default());

        assert!(matches!(result, Err(CorralError::BinaryMissing { .. })));
        assert!(!settings.plugin_dir.join("owner1@repo1").exists());
    }

    #[test]
    fn test_no_asset_for_platform_downloads_nothing() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let directory = demo_directory(DEMO_MANIFEST);
        let builtin = builtin();

        let result = InstallOperation::new(&settings, &directory, &Ed25519Verifier, &builtin)
            .with_platform(Platform::new("windows", "arm64"))
            .execute(
                &ValidatedPlugins::default(),
                &Source::new("owner1", "repo1"),
                &ReleaseSelector::Latest,
                &InstallOptions::default(),
            );

        assert!(matches!(result, Err(CorralError::NoMatchingAsset { .. })));
        assert_eq!(directory.downloads(), 0);
        assert!(!settings.plugin_dir.join("owner1@repo1").exists());
    }

    #[test]
    fn test_exact_version_falls_back_to_bare_tag() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let directory = demo_directory(DEMO_MANIFEST);
        directory.add_release(
            "owner1",
            "repo1",
            "1.2.0",
            vec![asset(1, "plugin_linux_amd64.tar.gz", "application/gzip")],
        );

        let outcome = install_with(
            &settings,
            &directory,
            &ValidatedPlugins::default(),
            &ReleaseSelector::Exact(Version::new(1, 2, 0)),
            &InstallOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome.tag, "1.2.0");
    }

    #[test]
    fn test_latest_stable_skips_prerelease() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let directory = demo_directory(DEMO_MANIFEST);
        directory.add_release(
            "owner1",
            "repo1",
            "v2.0.0-rc.1",
            vec![asset(1, "plugin_linux_amd64.tar.gz", "application/gzip")],
        );

        let outcome = install_with(
            &settings,
            &directory,
            &ValidatedPlugins::default(),
            &ReleaseSelector::LatestStable,
            &InstallOptions::default(),
        )
        .unwrap();

        assert_eq!(outcome.tag, "v1.0.0");
    }

    #[test]
    fn test_signed_release_is_verified() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let key = signing_key(1);
        let archive = demo_archive();
        let signature = format!(
            "{:x}  plugin_linux_amd64.tar.gz\n{}\n",
            Sha256::digest(&archive),
            sign(&key, &archive)
        );
        let directory = signed_directory(&signature, &key);

        let outcome = install(&settings, &directory, &ValidatedPlugins::default()).unwrap();

        assert_eq!(outcome.tag, "v1.1.0");
        assert_eq!(directory.downloads(), 3);
    }

    #[test]
    fn test_signature_from_other_key_installs_nothing() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let archive = demo_archive();
        let signature = format!(
            "{:x}  plugin_linux_amd64.tar.gz\n{}\n",
            Sha256::digest(&archive),
            sign(&signing_key(2), &archive)
        );
        let directory = signed_directory(&signature, &signing_key(3));

        let result = install(&settings, &directory, &ValidatedPlugins::default());

        assert!(matches!(result, Err(CorralError::SignatureMismatch { .. })));
        assert!(!settings.plugin_dir.join("owner1@repo1").exists());
    }

    #[test]
    fn test_signature_mismatch_installs_nothing() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let key = signing_key(4);
        let directory = signed_directory(&sign(&key, b"another archive"), &key);

        let result = install(&settings, &directory, &ValidatedPlugins::default());

        assert!(matches!(result, Err(CorralError::SignatureMismatch { .. })));
        assert!(!settings.plugin_dir.join("owner1@repo1").exists());
    }

    #[test]
    fn test_skip_signature_verification() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let key = signing_key(5);
        let directory = signed_directory(&sign(&key, b"another archive"), &key);

        let outcome = install_with(
            &settings,
            &directory,
            &ValidatedPlugins::default(),
            &ReleaseSelector::Latest,
            &InstallOptions {
                skip_signature_verification: true,
                show_progress: false,
            },
        )
        .unwrap();

        assert_eq!(outcome.plugin.name, "demo");
        assert_eq!(directory.downloads(), 1);
    }

    #[test]
    fn test_stale_directory_is_replaced() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        let stale = settings.plugin_dir.join("owner1@repo1");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("leftover.txt"), "x").unwrap();
        let directory = demo_directory(DEMO_MANIFEST);

        install(&settings, &directory, &ValidatedPlugins::default()).unwrap();

        assert!(!stale.join("leftover.txt").exists());
        assert!(stale.join("demo").is_file());
    }

    #[test]
    fn test_conflicting_plugin_stays_installed() {
        let temp = TempDir::new().unwrap();
        let settings = settings(&temp);
        write_plugin(&settings.plugin_dir, "someone@tool", "tool", &["demo"]);
        let registry = ValidatedPlugins::scan(&settings.plugin_roots(), &builtin());
        let directory = demo_directory(DEMO_MANIFEST);

        let outcome = install(&settings, &directory, &registry).unwrap();

        assert_eq!(outcome.conflict, Some(Conflict::Command("demo".to_string())));
        assert!(settings.plugin_dir.join("owner1@repo1").is_dir());
    }

    #[test]
    fn test_install_target() {
        let registry = ValidatedPlugins::default();

        let (source, selector) =
            install_target(&PluginSpecifier::parse("owner1/repo1@1.2").unwrap(), &registry)
                .unwrap();
        assert_eq!(source, Source::new("owner1", "repo1"));
        assert_eq!(selector, ReleaseSelector::Exact(Version::new(1, 2, 0)));

        let (source, selector) = install_target(
            &PluginSpecifier::parse("atlas-cli-plugin-gsa").unwrap(),
            &registry,
        )
        .unwrap();
        assert_eq!(source, Source::new("mongodb", "atlas-cli-plugin-gsa"));
        assert_eq!(selector, ReleaseSelector::Latest);

        assert!(matches!(
            install_target(&PluginSpecifier::parse("unknown").unwrap(), &registry),
            Err(CorralError::InvalidSpecifier { .. })
        ));
    }

    #[test]
    fn test_install_target_rejects_installed_name() {
        let temp = TempDir::new().unwrap();
        write_plugin(temp.path(), "owner1@repo1", "demo", &["demo"]);
        let registry = ValidatedPlugins::scan(&[temp.path().to_path_buf()], &builtin());

        assert!(matches!(
            install_target(&PluginSpecifier::parse("demo").unwrap(), &registry),
            Err(CorralError::SourceConflict { .. })
        ));
    }
}
