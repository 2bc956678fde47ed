//! Update operation
//!
//! Argument handling and target resolution only. Replacing an installed plugin with a newer
//! release is not implemented, so every accepted request ends in `UpdateNotSupported`.

use crate::error::{CorralError, Result};
use crate::plugin::{Plugin, ValidatedPlugins};
use crate::specifier::PluginSpecifier;

/// What `plugin update` was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRequest {
    All,
    One(PluginSpecifier),
}

impl UpdateRequest {
    /// Validate the combination of a plugin argument and `--all`
    pub fn from_args(plugin: Option<&str>, all: bool) -> Result<Self> {
        match (plugin, all) {
            (Some(_), true) => Err(CorralError::UpdateArguments {
                message: r#"either the "--all" flag or the plugin identifier can be provided, but not both"#
                    .to_string(),
            }),
            (None, false) => Err(CorralError::UpdateArguments {
                message: r#"either the "--all" flag or the plugin identifier needs to be provided"#
                    .to_string(),
            }),
            (None, true) => Ok(Self::All),
            (Some(target), false) => Ok(Self::One(PluginSpecifier::parse(target)?)),
        }
    }
}

/// The installed plugin a single-plugin update targets
///
/// Only plugins installed from a repository can be updated.
pub fn update_target<'a>(
    registry: &'a ValidatedPlugins,
    specifier: &PluginSpecifier,
) -> Result<&'a Plugin> {
    let plugin = registry.find(specifier)?;
    if plugin.source.is_none() {
        return Err(CorralError::PluginHasNoSource {
            name: plugin.name.clone(),
        });
    }
    Ok(plugin)
}

/// Run an update request
pub fn update(registry: &ValidatedPlugins, request: &UpdateRequest) -> Result<()> {
    let name = match request {
        UpdateRequest::All => "all plugins".to_string(),
        UpdateRequest::One(specifier) => update_target(registry, specifier)?.name.clone(),
    };
    Err(CorralError::UpdateNotSupported { name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::fixtures::write_plugin;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn test_from_args() {
        assert!(matches!(
            UpdateRequest::from_args(Some("demo"), true),
            Err(CorralError::UpdateArguments { message }) if message.contains("but not both")
        ));
        assert!(matches!(
            UpdateRequest::from_args(None, false),
            Err(CorralError::UpdateArguments { message }) if message.contains("needs to be provided")
        ));
        assert_eq!(UpdateRequest::from_args(None, true).unwrap(), UpdateRequest::All);
        assert!(matches!(
            UpdateRequest::from_args(Some("owner/repo@2.0.0"), false).unwrap(),
            UpdateRequest::One(PluginSpecifier::Repository { .. })
        ));
        assert!(matches!(
            UpdateRequest::from_args(Some("owner/repo@"), false),
            Err(CorralError::InvalidSpecifier { .. })
        ));
    }

    #[test]
    fn test_update_requires_source() {
        let temp = TempDir::new().unwrap();
        write_plugin(temp.path(), "manual", "manual", &["manual"]);
        write_plugin(temp.path(), "owner1@repo1", "demo", &["demo"]);
        let registry = ValidatedPlugins::scan(&[temp.path().to_path_buf()], &HashSet::new());

        assert!(matches!(
            update(&registry, &UpdateRequest::from_args(Some("manual"), false).unwrap()),
            Err(CorralError::PluginHasNoSource { .. })
        ));
        assert!(matches!(
            update(&registry, &UpdateRequest::from_args(Some("owner1/repo1"), false).unwrap()),
            Err(CorralError::UpdateNotSupported { name }) if name == "demo"
        ));
        assert!(matches!(
            update(&registry, &UpdateRequest::All),
            Err(CorralError::UpdateNotSupported { .. })
        ));
    }
}
