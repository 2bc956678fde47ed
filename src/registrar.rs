//! Plugin commands as CLI subcommands
//!
//! Every valid plugin contributes one [`CommandDescriptor`] per manifest command. First-class
//! plugins that are not installed contribute stubs that install the plugin before running it.
//! Descriptors become pass-through subcommands: everything after the command name, `--help`
//! included, is forwarded to the plugin binary.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use tracing::debug;

use crate::plugin::first_class::{FIRST_CLASS_PLUGINS, FirstClassPlugin};
use crate::plugin::{Plugin, ValidatedPlugins};

/// Argument holding everything after a plugin command name
const ARGS_ID: &str = "args";

/// Names reserved for corral even when not registered as subcommands
const RESERVED_COMMANDS: &[&str] = &["plugin", "help"];

/// What invoking a plugin command does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    /// Run an installed plugin
    Run(Plugin),
    /// Install a first-class plugin, then run it
    InstallThenRun(&'static FirstClassPlugin),
}

/// A plugin command ready to be registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub aliases: Vec<String>,
    pub action: CommandAction,
}

impl CommandDescriptor {
    /// Whether `command` is this command's name or one of its aliases
    pub fn matches(&self, command: &str) -> bool {
        self.name == command || self.aliases.iter().any(|a| a == command)
    }

    fn to_command(&self) -> Command {
        Command::new(self.name.clone())
            .about(self.description.clone())
            .visible_aliases(self.aliases.clone())
            .disable_help_flag(true)
            .disable_version_flag(true)
            .arg(
                Arg::new(ARGS_ID)
                    .num_args(0..)
                    .trailing_var_arg(true)
                    .allow_hyphen_values(true)
                    .action(ArgAction::Append)
                    .value_parser(value_parser!(OsString)),
            )
    }
}

/// Descriptors for every valid plugin command and every offered first-class stub
///
/// A first-class stub is offered only while no plugin from its repository is installed and
/// its command name is free.
pub fn descriptors(
    registry: &ValidatedPlugins,
    builtin_commands: &HashSet<String>,
) -> Vec<CommandDescriptor> {
    let mut descriptors: Vec<CommandDescriptor> = registry
        .valid
        .iter()
        .flat_map(|plugin| {
            plugin.commands.iter().map(move |command| CommandDescriptor {
                name: command.name.clone(),
                description: command.description.clone(),
                aliases: command.aliases.clone(),
                action: CommandAction::Run(plugin.clone()),
            })
        })
        .collect();

    let mut taken = builtin_commands.clone();
    taken.extend(
        registry
            .valid
            .iter()
            .flat_map(|p| p.command_names())
            .map(str::to_string),
    );

    for first_class in FIRST_CLASS_PLUGINS.iter().filter(|p| !p.is_installed(registry)) {
        for command in first_class.commands {
            if !taken.insert(command.name.to_string()) {
                debug!(
                    "Not offering first-class command '{}', the name is taken",
                    command.name
                );
                continue;
            }
            descriptors.push(CommandDescriptor {
                name: command.name.to_string(),
                description: command.description.to_string(),
                aliases: Vec::new(),
                action: CommandAction::InstallThenRun(first_class),
            });
        }
    }

    descriptors
}

/// Add descriptors to `command` as pass-through subcommands
pub fn register(command: Command, descriptors: &[CommandDescriptor]) -> Command {
    descriptors
        .iter()
        .fold(command, |command, descriptor| {
            command.subcommand(descriptor.to_command())
        })
}

/// Subcommand names and aliases of `command`, plus the reserved names
pub fn builtin_commands(command: &Command) -> HashSet<String> {
    let mut names: HashSet<String> = command
        .get_subcommands()
        .flat_map(|sub| std::iter::once(sub.get_name()).chain(sub.get_all_aliases()))
        .map(str::to_string)
        .collect();
    names.extend(RESERVED_COMMANDS.iter().map(ToString::to_string));
    names
}

/// Descriptor invoked as `command`
pub fn find<'a>(
    descriptors: &'a [CommandDescriptor],
    command: &OsStr,
) -> Option<&'a CommandDescriptor> {
    let command = command.to_str()?;
    descriptors.iter().find(|d| d.matches(command))
}

/// Descriptor and forwarded arguments when `matches` selected a plugin command
pub fn invocation<'a>(
    matches: &ArgMatches,
    descriptors: &'a [CommandDescriptor],
) -> Option<(&'a CommandDescriptor, Vec<OsString>)> {
    let (name, sub_matches) = matches.subcommand()?;
    let descriptor = descriptors.iter().find(|d| d.name == name)?;
    let args = sub_matches
        .get_many::<OsString>(ARGS_ID)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    Some((descriptor, args))
}
