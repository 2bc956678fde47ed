//! Uninstall operation

use inquire::Confirm;
use tracing::debug;

use crate::error::Result;
use crate::plugin::{Plugin, ValidatedPlugins};
use crate::specifier::PluginSpecifier;

/// Remove the plugin identified by `target`
///
/// `target` is `<owner>/<repo>`, a repository URL or a plugin name; a version suffix is
/// ignored. Returns the removed plugin, or `None` when `confirm` declined.
pub fn uninstall(
    registry: &ValidatedPlugins,
    target: &str,
    confirm: impl FnOnce(&Plugin) -> Result<bool>,
) -> Result<Option<Plugin>> {
    let specifier = PluginSpecifier::parse_lookup(target);
    let plugin = registry.find(&specifier)?;

    if !confirm(plugin)? {
        debug!("Uninstall of '{}' cancelled", plugin.name);
        return Ok(None);
    }

    plugin.uninstall()?;
    Ok(Some(plugin.clone()))
}

/// Ask the user before removing `plugin`
pub fn confirm_uninstall(plugin: &Plugin) -> Result<bool> {
    let prompt = match &plugin.source {
        Some(source) => format!("Uninstall plugin {} ({source})?", plugin.name),
        None => format!("Uninstall plugin {}?", plugin.name),
    };
    Ok(Confirm::new(&prompt)
        .with_default(true)
        .with_help_message("Press Enter to confirm, or 'n' to cancel")
        .prompt()?)
}
