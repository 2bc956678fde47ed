//! Plugin manifest loading and validation
//!
//! Every plugin directory carries a `manifest.yml` (or `manifest.yaml`) at its root:
//!
//! ```yaml
//! name: kubernetes
//! description: Manage Kubernetes resources
//! binary: binary/kubernetes
//! version: 1.2.0
//! github:
//!   owner: mongodb
//!   name: atlas-cli-plugin-kubernetes
//! commands:
//!   kubernetes:
//!     description: Kubernetes operator commands
//!     aliases: [k8s]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::archive::clean_entry_path;
use crate::error::{Result, fs as fs_error, manifest};

/// Accepted manifest file names, in lookup order
pub const MANIFEST_FILENAMES: &[&str] = &["manifest.yml", "manifest.yaml"];

/// Repository a plugin was published from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestGithub {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub name: String,
}

/// A command exposed by a plugin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCommand {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// Parsed `manifest.yml`
///
/// Fields are optional at parse time so that [`Manifest::validate`] can report every
/// missing value at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub binary: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<ManifestGithub>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<BTreeMap<String, ManifestCommand>>,
}

fn not_defined(field: &str) -> String {
    format!(r#"value "{field}" is not defined"#)
}

impl Manifest {
    /// Parse manifest YAML read from `path`
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| manifest::unparseable(path.display().to_string(), e.to_string()))
    }

    /// Every violated invariant, empty when the manifest is valid
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("binary", &self.binary),
        ] {
            if value.trim().is_empty() {
                errors.push(not_defined(field));
            }
        }

        if self.version.trim().is_empty() {
            errors.push(not_defined("version"));
        } else if parse_version(&self.version).is_none() {
            errors.push(r#"value in field "version" is not a valid semantic version"#.to_string());
        }

        if let Some(github) = &self.github {
            if github.owner.trim().is_empty() {
                errors.push(not_defined("github owner"));
            }
            if github.name.trim().is_empty() {
                errors.push(not_defined("github name"));
            }
        }

        match &self.commands {
            None => errors.push(not_defined("commands")),
            Some(commands) if commands.is_empty() => {
                errors.push("the plugin needs to contain at least one command".to_string());
            }
            Some(commands) => {
                for (name, command) in commands {
                    if command.description.trim().is_empty() {
                        errors.push(format!(
                            r#"value "description" in command "{name}" is not defined"#
                        ));
                    }
                }
            }
        }

        errors
    }

    /// Parsed version; `None` unless the manifest is valid
    pub fn semver(&self) -> Option<Version> {
        parse_version(&self.version)
    }
}

/// `MAJOR.MINOR.PATCH` with optional pre-release and build metadata, `v` prefix allowed
fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim();
    Version::parse(version.strip_prefix('v').unwrap_or(version)).ok()
}

/// Find the manifest file in a plugin directory
pub fn manifest_path(plugin_dir: &Path) -> Option<PathBuf> {
    MANIFEST_FILENAMES
        .iter()
        .map(|name| plugin_dir.join(name))
        .find(|path| path.is_file())
}

/// Load the manifest of a plugin directory without validating it
pub fn load(plugin_dir: &Path) -> Result<Manifest> {
    let path = manifest_path(plugin_dir)
        .ok_or_else(|| manifest::missing(plugin_dir.display().to_string()))?;
    debug!("Loading manifest {}", path.display());
    let content = fs::read_to_string(&path)
        .map_err(|e| fs_error::read_failed(path.display().to_string(), e.to_string()))?;
    Manifest::parse(&content, plugin_dir)
}

/// Load and validate the manifest of a plugin directory
pub fn load_validated(plugin_dir: &Path) -> Result<Manifest> {
    let manifest = load(plugin_dir)?;
    let errors = manifest.validate();
    if !errors.is_empty() {
        return Err(manifest::invalid(plugin_dir.display().to_string(), errors));
    }
    Ok(manifest)
}

/// Resolve the plugin binary inside `plugin_dir`, making it executable if needed
pub fn executable_binary(plugin_dir: &Path, binary: &str) -> Result<PathBuf> {
    let relative =
        clean_entry_path(binary)?.ok_or_else(|| manifest::binary_missing(binary.to_string()))?;
    let path = plugin_dir.join(relative);
    if !path.is_file() {
        return Err(manifest::binary_missing(path.display().to_string()));
    }
    ensure_executable(&path)?;
    Ok(path)
}

#[cfg(unix)]
fn ensure_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    const EXECUTABLE: u32 = 0o111;
    let mode = fs::metadata(path)?.permissions().mode();
    if mode & EXECUTABLE == 0 {
        debug!("Making {} executable", path.display());
        fs::set_permissions(path, fs::Permissions::from_mode(mode | EXECUTABLE))
            .map_err(|e| fs_error::write_failed(path.display().to_string(), e.to_string()))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_executable(_path: &Path) -> Result<()> {
    Ok(())
}
