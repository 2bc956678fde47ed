//! Installed plugins
//!
//! - [`registry`]: the per-process collection of installed plugins
//! - [`conflict`]: source, name and command conflict checks
//! - [`first_class`]: curated plugins offered as auto-installing commands
//! - [`signature`]: verification of signed release archives

pub mod conflict;
pub mod first_class;
pub mod registry;
pub mod signature;

use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use semver::Version;
use tracing::debug;

use crate::error::{Result, fs as fs_error, manifest, plugin};
use crate::manifest::{Manifest, executable_binary, load_validated};

pub use registry::ValidatedPlugins;

/// Separator between owner and repository in plugin directory names
const DIRECTORY_SEPARATOR: char = '@';

/// Repository a plugin was installed from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Source {
    pub owner: String,
    pub repo: String,
}

impl Source {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Directory name of a plugin installed from this source (`owner@repo`)
    pub fn directory_name(&self) -> String {
        format!("{}{DIRECTORY_SEPARATOR}{}", self.owner, self.repo)
    }

    /// Parse an `owner@repo` directory name
    pub fn from_directory_name(name: &str) -> Option<Self> {
        let (owner, repo) = name.split_once(DIRECTORY_SEPARATOR)?;
        (!owner.is_empty() && !repo.is_empty() && !repo.contains(DIRECTORY_SEPARATOR))
            .then(|| Self::new(owner, repo))
    }

    pub fn matches(&self, owner: &str, repo: &str) -> bool {
        self.owner == owner && self.repo == repo
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A command exposed by a plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCommand {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
}

/// A validated plugin installed on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    pub name: String,
    pub description: String,
    pub version: Version,
    pub directory: PathBuf,
    pub binary: String,
    pub source: Option<Source>,
    pub commands: Vec<PluginCommand>,
}

impl Plugin {
    /// Load, validate and check the plugin in `directory`
    pub fn load(directory: &Path) -> Result<Self> {
        let manifest = load_validated(directory)?;
        executable_binary(directory, &manifest.binary)?;
        Self::from_manifest(manifest, directory.to_path_buf())
    }

    /// Build a plugin from a validated manifest
    ///
    /// Provenance comes from the manifest's `github` block, or else from an `owner@repo`
    /// directory name.
    pub fn from_manifest(manifest: Manifest, directory: PathBuf) -> Result<Self> {
        let version = manifest.semver().ok_or_else(|| {
            manifest::invalid(
                directory.display().to_string(),
                vec![r#"value in field "version" is not a valid semantic version"#.to_string()],
            )
        })?;

        let source = manifest
            .github
            .map(|g| Source::new(g.owner, g.name))
            .or_else(|| {
                directory
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(Source::from_directory_name)
            });

        let commands = manifest
            .commands
            .unwrap_or_default()
            .into_iter()
            .map(|(name, command)| PluginCommand {
                name,
                description: command.description,
                aliases: command.aliases,
            })
            .collect();

        Ok(Self {
            name: manifest.name,
            description: manifest.description,
            version,
            directory,
            binary: manifest.binary,
            source,
            commands,
        })
    }

    /// Command names and aliases
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().flat_map(|c| {
            std::iter::once(c.name.as_str()).chain(c.aliases.iter().map(String::as_str))
        })
    }

    /// Whether `name` is one of this plugin's commands or aliases
    pub fn has_command(&self, name: &str) -> bool {
        self.command_names().any(|c| c == name)
    }

    pub fn has_source(&self, owner: &str, repo: &str) -> bool {
        self.source.as_ref().is_some_and(|s| s.matches(owner, repo))
    }

    /// Run `command` with `args`, inheriting standard streams and environment
    ///
    /// Returns the exit code of the plugin binary.
    pub fn run(&self, command: &str, args: &[OsString]) -> Result<i32> {
        let binary = executable_binary(&self.directory, &self.binary)?;
        debug!(
            "Running plugin '{}': {} {command} {args:?}",
            self.name,
            binary.display()
        );

        let status = Command::new(&binary)
            .arg(command)
            .args(args)
            .status()
            .map_err(|e| plugin::execution_failed(&self.name, e.to_string()))?;

        Ok(status.code().unwrap_or(1))
    }

    /// Remove the plugin directory
    pub fn uninstall(&self) -> Result<()> {
        debug!("Removing {}", self.directory.display());
        fs::remove_dir_all(&self.directory).map_err(|e| {
            fs_error::write_failed(self.directory.display().to_string(), e.to_string())
        })
    }
}
