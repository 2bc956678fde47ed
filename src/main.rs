//! Corral - plugin manager for command line tools
//!
//! Installs plugins published as GitHub release archives, validates their manifests and
//! exposes their commands next to the built-in ones.

use std::ffi::OsString;

use clap::{CommandFactory, FromArgMatches, Parser};

mod archive;
mod asset;
mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod manifest;
mod operations;
mod plugin;
mod progress;
mod registrar;
mod release;
mod specifier;
mod temp;

use cli::{Cli, Commands};
use commands::Context;
use error::Result;

fn run_command(context: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Plugin(args) => commands::plugin::run(context, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args, context.command()),
    }
}

/// Run the CLI and return the process exit code
fn run(args: &[OsString]) -> Result<i32> {
    if let Ok(cli) = Cli::try_parse_from(args) {
        logging::init(cli.global.verbose);
        let context = Context::load(&cli.global)?;
        return run_command(&context, cli.command).map(|()| 0);
    }

    // Not a built-in command: read the global options preceding it and try the plugins
    let global = cli::global_args(args);
    logging::init(global.verbose);
    let context = Context::load(&global)?;
    let descriptors = context.descriptors();

    let invoked = cli::command_position(args).and_then(|position| {
        registrar::find(&descriptors, &args[position]).map(|d| (d, &args[position + 1..]))
    });
    if let Some((descriptor, forwarded)) = invoked {
        return commands::external::run(&context, descriptor, forwarded);
    }

    // Renders help or the usage error, with plugin commands listed
    let matches = registrar::register(Cli::command(), &descriptors).get_matches_from(args);
    if let Some((descriptor, forwarded)) = registrar::invocation(&matches, &descriptors) {
        return commands::external::run(&context, descriptor, &forwarded);
    }
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    run_command(&context, cli.command).map(|()| 0)
}

fn main() {
    let args: Vec<OsString> = std::env::args_os().collect();

    let code = match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    std::process::exit(code);
}
