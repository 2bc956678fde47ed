//! First-class plugins
//!
//! Plugins curated by the corral maintainers. Until one is installed its commands are still
//! offered; running one installs the plugin and then runs it.

use super::{Plugin, Source, ValidatedPlugins};
use crate::error::{CorralError, Result};
use crate::specifier::parse_lenient;

/// A command offered by a first-class plugin before it is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstClassCommand {
    pub name: &'static str,
    pub description: &'static str,
}

/// A curated plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstClassPlugin {
    pub name: &'static str,
    pub owner: &'static str,
    pub repo: &'static str,
    pub commands: &'static [FirstClassCommand],
    /// Oldest release this version of corral can run
    pub minimum_version: Option<&'static str>,
}

pub const FIRST_CLASS_PLUGINS: &[FirstClassPlugin] = &[
    FirstClassPlugin {
        name: "atlas-cli-plugin-kubernetes",
        owner: "mongodb",
        repo: "atlas-cli-plugin-kubernetes",
        commands: &[FirstClassCommand {
            name: "kubernetes",
            description: "Manage Kubernetes resources.",
        }],
        minimum_version: Some("v1.1.7"),
    },
    FirstClassPlugin {
        name: "atlas-cli-plugin-gsa",
        owner: "mongodb",
        repo: "atlas-cli-plugin-gsa",
        commands: &[FirstClassCommand {
            name: "gsa",
            description: "Manage Google Service Accounts.",
        }],
        minimum_version: Some("v0.0.2"),
    },
];

impl FirstClassPlugin {
    pub fn source(&self) -> Source {
        Source::new(self.owner, self.repo)
    }

    /// Whether a plugin from this source is installed, valid or not
    pub fn is_installed(&self, registry: &ValidatedPlugins) -> bool {
        registry.all().any(|p| p.has_source(self.owner, self.repo))
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.iter().any(|c| c.name == name)
    }
}

/// First-class plugin a bare name refers to, by name or repository name
pub fn find_by_name(name: &str) -> Option<&'static FirstClassPlugin> {
    FIRST_CLASS_PLUGINS
        .iter()
        .find(|p| p.name == name || p.repo == name || p.has_command(name))
}

/// Fail if `plugin` is a first-class plugin older than its minimum supported version
pub fn check_minimum_version(plugin: &Plugin) -> Result<()> {
    let Some(source) = &plugin.source else {
        return Ok(());
    };
    let Some((first_class, minimum)) = FIRST_CLASS_PLUGINS
        .iter()
        .filter(|p| source.matches(p.owner, p.repo))
        .find_map(|p| p.minimum_version.map(|m| (p, m)))
    else {
        return Ok(());
    };

    match parse_lenient(minimum) {
        Some(required) if plugin.version < required => Err(CorralError::PluginVersionTooOld {
            repository: first_class.source().to_string(),
            version: format!("v{}", plugin.version),
            minimum: minimum.to_string(),
        }),
        _ => Ok(()),
    }
}
