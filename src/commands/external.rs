//! Dispatch of plugin commands

use std::ffi::OsString;

use super::Context;
use crate::error::Result;
use crate::operations::{InstallOperation, InstallOptions, ReleaseSelector};
use crate::plugin::first_class::{FirstClassPlugin, check_minimum_version};
use crate::plugin::Plugin;
use crate::plugin::signature::Ed25519Verifier;
use crate::registrar::{CommandAction, CommandDescriptor};

/// Run a plugin command, returning the plugin's exit code
pub fn run(context: &Context, descriptor: &CommandDescriptor, args: &[OsString]) -> Result<i32> {
    let plugin = match &descriptor.action {
        CommandAction::Run(plugin) => plugin.clone(),
        CommandAction::InstallThenRun(first_class) => install_first_class(context, first_class)?,
    };
    run_plugin(&plugin, &descriptor.name, args)
}

fn run_plugin(plugin: &Plugin, command: &str, args: &[OsString]) -> Result<i32> {
    check_minimum_version(plugin)?;
    plugin.run(command, args)
}

fn install_first_class(context: &Context, first_class: &FirstClassPlugin) -> Result<Plugin> {
    let source = first_class.source();
    eprintln!("Plugin {source} is not installed yet, installing it now");

    let directory = context.release_directory()?;
    let outcome = InstallOperation::new(
        &context.settings,
        &directory,
        &Ed25519Verifier,
        &context.builtin_commands,
    )
    .execute(
        &context.registry,
        &source,
        &ReleaseSelector::LatestStable,
        &InstallOptions {
            skip_signature_verification: false,
            show_progress: true,
        },
    )?;

    if let Some(conflict) = outcome.conflict {
        return Err(conflict.into_error(&outcome.plugin));
    }
    eprintln!("Plugin {source} successfully installed");
    Ok(outcome.plugin)
}
