//! Registry of installed plugins
//!
//! Built once per process by scanning the plugin directories. Each plugin lands in exactly
//! one bucket: valid, duplicate name or duplicate command. Only valid plugins expose
//! commands.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::conflict::{self, Conflict};
use super::{Plugin, Source};
use crate::error::{CorralError, Result, plugin};
use crate::specifier::PluginSpecifier;

/// Installed plugins partitioned by conflict class
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPlugins {
    pub valid: Vec<Plugin>,
    pub duplicate_name: Vec<Plugin>,
    pub duplicate_command: Vec<Plugin>,
}

impl ValidatedPlugins {
    /// Scan plugin directories and classify every loadable plugin
    ///
    /// Roots that do not exist are skipped. Plugin directories are visited in name order, so
    /// which of two plugins with clashing commands stays valid does not depend on the file
    /// system.
    pub fn scan(roots: &[PathBuf], builtin_commands: &HashSet<String>) -> Self {
        let mut plugins = Vec::new();
        for root in roots {
            match plugin_directories(root) {
                Ok(directories) => {
                    for directory in directories {
                        match Plugin::load(&directory) {
                            Ok(plugin) => plugins.push(plugin),
                            Err(e) => warn!("-- plugin warning: {e}"),
                        }
                    }
                }
                Err(e) => warn!(
                    "-- plugin warning: could not load plugins from directory \"{}\": {e}",
                    root.display()
                ),
            }
        }
        Self::classify(plugins, builtin_commands)
    }

    /// Partition plugins into buckets
    ///
    /// All plugins sharing a name are duplicates. The remaining plugins are accepted in
    /// order unless one of their commands or aliases is already taken by a built-in command
    /// or an earlier accepted plugin.
    pub fn classify(plugins: Vec<Plugin>, builtin_commands: &HashSet<String>) -> Self {
        let duplicate_names = conflict::duplicate_names(&plugins);
        let mut taken: HashSet<String> = builtin_commands.clone();
        let mut registry = Self::default();

        for plugin in plugins {
            if duplicate_names.contains(&plugin.name) {
                warn!(
                    "-- plugin warning: could not load plugin \"{}\" because there are multiple plugins with that name",
                    plugin.name
                );
                registry.duplicate_name.push(plugin);
            } else if let Some(command) = conflict::conflicting_command(&plugin, &taken) {
                warn!(
                    "-- plugin warning: could not load plugin \"{}\" because its command \"{command}\" already exists in corral or another plugin",
                    plugin.name
                );
                registry.duplicate_command.push(plugin);
            } else {
                taken.extend(plugin.command_names().map(str::to_string));
                registry.valid.push(plugin);
            }
        }

        debug!(
            "Plugins: {} valid, {} duplicate name, {} duplicate command",
            registry.valid.len(),
            registry.duplicate_name.len(),
            registry.duplicate_command.len()
        );
        registry
    }

    /// Every plugin regardless of bucket
    pub fn all(&self) -> impl Iterator<Item = &Plugin> {
        self.valid
            .iter()
            .chain(&self.duplicate_name)
            .chain(&self.duplicate_command)
    }

    pub fn is_empty(&self) -> bool {
        self.all().next().is_none()
    }

    /// Plugin installed from `owner/repo`, in any bucket
    pub fn find_by_source(&self, owner: &str, repo: &str) -> Result<&Plugin> {
        let mut matches = self.all().filter(|p| p.has_source(owner, repo));
        let found = matches
            .next()
            .ok_or_else(|| plugin::not_found(format!("{owner}/{repo}")))?;
        if matches.next().is_some() {
            return Err(CorralError::AmbiguousPluginSource {
                repository: format!("{owner}/{repo}"),
            });
        }
        Ok(found)
    }

    /// Plugin with manifest name `name`, in any bucket
    pub fn find_by_name(&self, name: &str) -> Result<&Plugin> {
        let mut matches = self.all().filter(|p| p.name == name);
        let found = matches.next().ok_or_else(|| plugin::not_found(name))?;
        if matches.next().is_some() {
            return Err(plugin::ambiguous_name(name));
        }
        Ok(found)
    }

    /// Plugin identified by a specifier
    pub fn find(&self, specifier: &PluginSpecifier) -> Result<&Plugin> {
        match specifier {
            PluginSpecifier::Repository { owner, repo, .. } => self.find_by_source(owner, repo),
            PluginSpecifier::Name { name, .. } => self.find_by_name(name),
        }
    }

    /// Fail if a plugin from `source` is already installed, or a registered plugin lives in
    /// the directory `source` would be installed into
    ///
    /// A manifest's `github` block can name another repository than its directory does, so
    /// both are checked.
    pub fn check_source_conflict(&self, source: &Source, directory: &Path) -> Result<()> {
        if let Some(claimed) = self
            .all()
            .find(|p| p.has_source(&source.owner, &source.repo) || p.directory == directory)
        {
            debug!(
                "{source} conflicts with plugin '{}' in {}",
                claimed.name,
                claimed.directory.display()
            );
            return Err(plugin::source_conflict(source.to_string()));
        }
        Ok(())
    }

    /// How a newly installed plugin would be classified next to the installed ones
    pub fn conflict_for(
        &self,
        candidate: &Plugin,
        builtin_commands: &HashSet<String>,
    ) -> Option<Conflict> {
        conflict::classify_candidate(candidate, self, builtin_commands)
    }
}

/// Subdirectories of a plugin root, sorted by name
fn plugin_directories(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut directories: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.path())
        .collect();
    directories.sort();
    Ok(directories)
}
