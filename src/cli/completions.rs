use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    corral completions bash > ~/.bash_completion.d/corral\n\n\
                  Generate zsh completions:\n    corral completions zsh > ~/.zfunc/_corral\n\n\
                  Generate fish completions:\n    corral completions fish > ~/.config/fish/completions/corral.fish\n\n\
                  Generate PowerShell completions:\n    corral completions powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
