use clap::{Parser, Subcommand};

/// Arguments for the plugin command
#[derive(Parser, Debug)]
pub struct PluginArgs {
    #[command(subcommand)]
    pub command: PluginSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PluginSubcommand {
    /// Install a plugin from a GitHub release
    Install(InstallArgs),

    /// List installed plugins
    List,

    /// Remove an installed plugin
    Uninstall(UninstallArgs),

    /// Update an installed plugin
    Update(UpdateArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Install the latest release:\n    corral plugin install owner/repo\n\n\
                  Install from a GitHub URL:\n    corral plugin install https://github.com/owner/repo\n\n\
                  Install a specific version:\n    corral plugin install owner/repo@1.2.0\n\n\
                  Install a first-class plugin by name:\n    corral plugin install atlas-cli-plugin-kubernetes")]
pub struct InstallArgs {
    /// Plugin to install: <owner>/<repo>[@version], a GitHub URL, or a first-class plugin name
    pub plugin: String,

    /// Install even if the release signature cannot be verified
    #[arg(long)]
    pub skip_signature_verification: bool,
}

/// Arguments for the uninstall command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Uninstall by repository:\n    corral plugin uninstall owner/repo\n\n\
                  Uninstall by name:\n    corral plugin uninstall my-plugin\n\n\
                  Uninstall without confirmation:\n    corral plugin uninstall my-plugin -y")]
pub struct UninstallArgs {
    /// Plugin to remove: <owner>/<repo>, a GitHub URL, or the plugin name
    pub plugin: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Arguments for the update command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Update a plugin:\n    corral plugin update owner/repo\n\n\
                  Update to a specific version:\n    corral plugin update my-plugin@2.0.0\n\n\
                  Update all plugins:\n    corral plugin update --all")]
pub struct UpdateArgs {
    /// Plugin to update: <owner>/<repo>[@version] or the plugin name
    pub plugin: Option<String>,

    /// Update all plugins
    #[arg(long)]
    pub all: bool,

    /// Update even if the release signature cannot be verified
    #[arg(long)]
    pub skip_signature_verification: bool,
}
