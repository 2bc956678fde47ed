//! Error types and handling for Corral
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`specifier`]: Plugin specifier parsing errors
//! - [`release`]: Release lookup and download errors
//! - [`archive`]: Archive extraction errors
//! - [`manifest`]: Manifest loading and validation errors
//! - [`plugin`]: Registry lookup and conflict errors
//! - [`fs`]: File system errors

pub mod archive;
pub mod fs;
pub mod manifest;
pub mod plugin;
pub mod release;
pub mod specifier;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Corral operations
#[derive(Error, Diagnostic, Debug)]
pub enum CorralError {
    // Specifier errors
    #[error("Invalid plugin specifier '{input}': {reason}")]
    #[diagnostic(
        code(corral::specifier::invalid),
        help(
            "Use <github-owner>/<github-repository-name>[@version] or a full GitHub URL, e.g. corral plugin install owner/repo@1.2.3"
        )
    )]
    InvalidSpecifier { input: String, reason: String },

    // Release errors
    #[error("Could not find release {release} for {repository}")]
    #[diagnostic(
        code(corral::release::not_found),
        help("Check that the repository exists and publishes GitHub releases")
    )]
    ReleaseNotFound { repository: String, release: String },

    #[error("Could not find an asset to download from {repository} for {os} {arch}")]
    #[diagnostic(
        code(corral::release::no_matching_asset),
        help("The plugin does not publish a .tar.gz or .zip archive for this operating system and architecture")
    )]
    NoMatchingAsset {
        repository: String,
        os: String,
        arch: String,
    },

    #[error("Release asset '{asset}' is signed but the release has no public key")]
    #[diagnostic(
        code(corral::release::no_public_key),
        help("Ask the plugin author to publish the public key, or pass --skip-signature-verification")
    )]
    NoPublicKey { asset: String },

    #[error("Signature verification failed for '{asset}': {reason}")]
    #[diagnostic(code(corral::release::signature_mismatch))]
    SignatureMismatch { asset: String, reason: String },

    #[error("Could not download asset with ID {asset_id} from {repository}: {reason}")]
    #[diagnostic(code(corral::release::download_failed))]
    DownloadFailed {
        repository: String,
        asset_id: u64,
        reason: String,
    },

    #[error("Request to the release host failed: {message}")]
    #[diagnostic(
        code(corral::release::http_failed),
        help("Check your network connection; set GITHUB_TOKEN if you are rate limited")
    )]
    HttpRequestFailed { message: String },

    // Archive errors
    #[error("Illegal file path for extracted plugin asset file: {path}")]
    #[diagnostic(
        code(corral::archive::illegal_path),
        help("The archive tries to write outside of the plugin directory and was rejected")
    )]
    IllegalPath { path: String },

    #[error("Unsupported entry type in plugin archive: {path} ({kind})")]
    #[diagnostic(code(corral::archive::unsupported_entry))]
    UnsupportedEntryType { path: String, kind: String },

    #[error("Unsupported archive format: {reason}")]
    #[diagnostic(
        code(corral::archive::unsupported_format),
        help("Plugins must be distributed as .tar.gz, .tar or .zip archives")
    )]
    UnsupportedArchive { reason: String },

    #[error("Archive entry '{path}' exceeds the maximum extracted size of {limit} bytes")]
    #[diagnostic(code(corral::archive::entry_too_large))]
    ArchiveEntryTooLarge { path: String, limit: u64 },

    #[error("Failed to read plugin archive: {reason}")]
    #[diagnostic(code(corral::archive::read_failed))]
    ArchiveReadFailed { reason: String },

    // Manifest errors
    #[error("Plugin invalid: manifest file does not exist in plugin folder {path}")]
    #[diagnostic(
        code(corral::manifest::missing),
        help("A plugin must contain manifest.yml or manifest.yaml at its root")
    )]
    ManifestMissing { path: String },

    #[error("Manifest file of plugin in directory '{path}' could not be parsed: {reason}")]
    #[diagnostic(code(corral::manifest::unparseable))]
    ManifestUnparseable { path: String, reason: String },

    #[error(
        "Plugin in directory '{path}' could not be loaded due to the following error(s) in the manifest:\n{}",
        format_manifest_errors(.errors)
    )]
    #[diagnostic(code(corral::manifest::invalid))]
    ManifestInvalid { path: String, errors: Vec<String> },

    #[error("Binary '{path}' does not exist")]
    #[diagnostic(
        code(corral::manifest::binary_missing),
        help("The manifest 'binary' field must name an executable inside the plugin archive")
    )]
    BinaryMissing { path: String },

    // Plugin errors
    #[error("Plugin {repository} is already installed")]
    #[diagnostic(
        code(corral::plugin::source_conflict),
        help("Use 'corral plugin update' to change the installed version")
    )]
    SourceConflict { repository: String },

    #[error("Found multiple plugins with name {name}")]
    #[diagnostic(
        code(corral::plugin::ambiguous_name),
        help("Specify the plugin as <github-owner>/<github-repository-name> instead")
    )]
    AmbiguousPluginName { name: String },

    #[error("Found multiple plugins with github values {repository}")]
    #[diagnostic(code(corral::plugin::ambiguous_source))]
    AmbiguousPluginSource { repository: String },

    #[error("Plugin '{name}' contains command '{command}' that already exists in corral or another plugin")]
    #[diagnostic(code(corral::plugin::command_conflict))]
    CommandConflict { name: String, command: String },

    #[error("Could not find plugin {specifier}")]
    #[diagnostic(
        code(corral::plugin::not_found),
        help("Run 'corral plugin list' to see installed plugins")
    )]
    PluginNotFound { specifier: String },

    #[error("Plugin '{name}' does not contain any GitHub values")]
    #[diagnostic(
        code(corral::plugin::no_source),
        help("The plugin was probably added manually instead of using 'corral plugin install'")
    )]
    PluginHasNoSource { name: String },

    #[error(
        "Plugin {repository} version {version} is below minimum required version {minimum} for this version of corral"
    )]
    #[diagnostic(
        code(corral::plugin::version_too_old),
        help("Reinstall the plugin with 'corral plugin uninstall' followed by 'corral plugin install'")
    )]
    PluginVersionTooOld {
        repository: String,
        version: String,
        minimum: String,
    },

    #[error("Failed to run plugin '{name}': {reason}")]
    #[diagnostic(code(corral::plugin::execution_failed))]
    PluginExecutionFailed { name: String, reason: String },

    #[error("{message}")]
    #[diagnostic(code(corral::plugin::update_arguments))]
    UpdateArguments { message: String },

    #[error("Updating plugin '{name}' is not supported yet")]
    #[diagnostic(
        code(corral::plugin::update_not_supported),
        help("Run 'corral plugin uninstall' followed by 'corral plugin install' instead")
    )]
    UpdateNotSupported { name: String },

    #[error("Could not determine plugin directory: {reason}")]
    #[diagnostic(
        code(corral::plugin::dir_unavailable),
        help("Set --plugin-dir or CORRAL_PLUGIN_DIR to a writable directory")
    )]
    PluginDirUnavailable { reason: String },

    // File system errors
    #[error("Failed to read file {path}: {reason}")]
    #[diagnostic(code(corral::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file {path}: {reason}")]
    #[diagnostic(code(corral::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(corral::fs::io_error))]
    IoError { message: String },
}

fn format_manifest_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("\t- {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<std::io::Error> for CorralError {
    fn from(err: std::io::Error) -> Self {
        CorralError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for CorralError {
    fn from(err: serde_yaml::Error) -> Self {
        CorralError::ManifestUnparseable {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for CorralError {
    fn from(err: reqwest::Error) -> Self {
        CorralError::HttpRequestFailed {
            message: err.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for CorralError {
    fn from(err: zip::result::ZipError) -> Self {
        CorralError::ArchiveReadFailed {
            reason: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for CorralError {
    fn from(err: inquire::InquireError) -> Self {
        CorralError::IoError {
            message: format!("Failed to read confirmation: {err}"),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, CorralError>;

#[cfg(test)]
mod tests;
