//! `plugin` command implementation

use std::io;

use tracing::debug;

use super::Context;
use crate::cli::{InstallArgs, PluginArgs, PluginSubcommand, UninstallArgs, UpdateArgs};
use crate::error::Result;
use crate::operations::install::install_target;
use crate::operations::uninstall::{confirm_uninstall, uninstall};
use crate::operations::update::{UpdateRequest, update};
use crate::operations::{InstallOperation, InstallOptions, list};
use crate::plugin::signature::Ed25519Verifier;
use crate::specifier::PluginSpecifier;

/// Run plugin command
pub fn run(context: &Context, args: PluginArgs) -> Result<()> {
    match args.command {
        PluginSubcommand::Install(args) => run_install(context, &args),
        PluginSubcommand::List => list::render(&context.registry, &mut io::stdout().lock()),
        PluginSubcommand::Uninstall(args) => run_uninstall(context, &args),
        PluginSubcommand::Update(args) => run_update(context, &args),
    }
}

fn run_install(context: &Context, args: &InstallArgs) -> Result<()> {
    let specifier = PluginSpecifier::parse(&args.plugin)?;
    let (source, selector) = install_target(&specifier, &context.registry)?;
    let directory = context.release_directory()?;

    InstallOperation::new(
        &context.settings,
        &directory,
        &Ed25519Verifier,
        &context.builtin_commands,
    )
    .execute(
        &context.registry,
        &source,
        &selector,
        &InstallOptions {
            skip_signature_verification: args.skip_signature_verification,
            show_progress: true,
        },
    )?;

    println!("Plugin {source} successfully installed");
    Ok(())
}

fn run_uninstall(context: &Context, args: &UninstallArgs) -> Result<()> {
    let removed = uninstall(&context.registry, &args.plugin, |plugin| {
        if args.yes {
            Ok(true)
        } else {
            confirm_uninstall(plugin)
        }
    })?;

    match removed {
        Some(plugin) => println!("Plugin {} successfully uninstalled", plugin.name),
        None => println!("Uninstall cancelled."),
    }
    Ok(())
}

fn run_update(context: &Context, args: &UpdateArgs) -> Result<()> {
    let request = UpdateRequest::from_args(args.plugin.as_deref(), args.all)?;
    debug!(
        "Update requested: {request:?}, skip signature verification: {}",
        args.skip_signature_verification
    );
    update(&context.registry, &request)
}
