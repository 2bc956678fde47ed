//! Command implementations for the corral CLI

pub mod completions;
pub mod external;
pub mod plugin;
pub mod version;

use std::collections::HashSet;

use clap::CommandFactory;

use crate::cli::{Cli, GlobalArgs};
use crate::config::Settings;
use crate::error::Result;
use crate::plugin::ValidatedPlugins;
use crate::registrar::{self, CommandDescriptor};
use crate::release::GithubReleaseDirectory;

/// State shared by the commands of one invocation
pub struct Context {
    pub settings: Settings,
    pub builtin_commands: HashSet<String>,
    pub registry: ValidatedPlugins,
}

impl Context {
    /// Resolve settings and scan the installed plugins
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let settings = Settings::resolve(global.plugin_dir.clone())?;
        let builtin_commands = registrar::builtin_commands(&Cli::command());
        let registry = ValidatedPlugins::scan(&settings.plugin_roots(), &builtin_commands);
        Ok(Self {
            settings,
            builtin_commands,
            registry,
        })
    }

    /// Plugin commands available in this invocation
    pub fn descriptors(&self) -> Vec<CommandDescriptor> {
        registrar::descriptors(&self.registry, &self.builtin_commands)
    }

    /// The full command tree, plugin commands included
    pub fn command(&self) -> clap::Command {
        registrar::register(Cli::command(), &self.descriptors())
    }

    pub fn release_directory(&self) -> Result<GithubReleaseDirectory> {
        GithubReleaseDirectory::new(
            &self.settings.github_api_url,
            self.settings.github_token.as_deref(),
        )
    }
}
