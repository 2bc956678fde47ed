//! Shell completions command

use clap::Command;

use crate::cli::CompletionsArgs;
use crate::error::Result;

/// Generate shell completions for `command`, plugin commands included
pub fn run(args: CompletionsArgs, mut command: Command) -> Result<()> {
    let shell_name = args.shell.to_lowercase();
    let shell = match shell_name.as_str() {
        "bash" => clap_complete::Shell::Bash,
        "elvish" => clap_complete::Shell::Elvish,
        "fish" => clap_complete::Shell::Fish,
        "powershell" | "pwsh" => clap_complete::Shell::PowerShell,
        "zsh" => clap_complete::Shell::Zsh,
        _ => {
            eprintln!("Unknown shell: {}", args.shell);
            eprintln!("Supported shells: bash, elvish, fish, powershell, zsh");
            std::process::exit(1);
        }
    };

    clap_complete::generate(shell, &mut command, "corral", &mut std::io::stdout().lock());

    Ok(())
}
