//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - plugin: `plugin install|list|uninstall|update` arguments
//! - completions: Completions command arguments
//!
//! Plugin commands are not part of these definitions. They are registered at startup from
//! the installed plugins, see [`crate::registrar`].

use std::ffi::OsString;
use std::path::PathBuf;

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Args, Parser, Subcommand};

pub mod completions;
pub mod plugin;

pub use completions::CompletionsArgs;
pub use plugin::{InstallArgs, PluginArgs, PluginSubcommand, UninstallArgs, UpdateArgs};

/// Environment variable for `--plugin-dir`
pub const PLUGIN_DIR_ENV: &str = "CORRAL_PLUGIN_DIR";

/// Options accepted before any command
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Plugin directory (defaults to <config dir>/corral/plugins)
    #[arg(long, global = true, env = PLUGIN_DIR_ENV, value_name = "DIR")]
    pub plugin_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Corral - plugin manager for command line tools
///
/// Install, list and remove plugins distributed as GitHub release archives, and run their
/// commands as if they were built in.
#[derive(Parser, Debug)]
#[command(
    name = "corral",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Plugin manager for command line tools",
    long_about = "Corral installs plugins published as GitHub release archives, validates their \
                  manifests and exposes their commands as subcommands of corral.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  corral plugin install owner/repo        \x1b[90m# Install the latest release\x1b[0m\n   \
                  corral plugin install owner/repo@1.2.0  \x1b[90m# Install a specific version\x1b[0m\n   \
                  corral plugin list                      \x1b[90m# List installed plugins\x1b[0m\n   \
                  corral plugin uninstall owner/repo      \x1b[90m# Remove a plugin\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage plugins
    Plugin(PluginArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Only the global options, for reading them ahead of a plugin command
#[derive(Parser, Debug)]
#[command(name = "corral", disable_help_flag = true, disable_version_flag = true)]
struct GlobalOnly {
    #[command(flatten)]
    global: GlobalArgs,
}

/// Position of the first command in `args`, skipping global options
///
/// Returns `None` when an option other than a global one comes first.
pub fn command_position(args: &[OsString]) -> Option<usize> {
    let mut index = 1;
    while let Some(arg) = args.get(index) {
        let Some(arg) = arg.to_str() else {
            return Some(index);
        };
        match arg {
            "--plugin-dir" => index += 2,
            "-v" | "--verbose" => index += 1,
            _ if arg.starts_with("--plugin-dir=") => index += 1,
            _ if arg.starts_with('-') => return None,
            _ => return Some(index),
        }
    }
    None
}

/// Global options preceding the command in `args`
pub fn global_args(args: &[OsString]) -> GlobalArgs {
    let end = command_position(args).unwrap_or(args.len());
    GlobalOnly::try_parse_from(&args[..end])
        .or_else(|_| GlobalOnly::try_parse_from(args.iter().take(1)))
        .map(|parsed| parsed.global)
        .unwrap_or_default()
}
