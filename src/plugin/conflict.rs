//! Conflict detection between plugins
//!
//! Three independent classes: same source repository (install is refused), same manifest
//! name and overlapping command names or aliases (the plugin stays installed but inert).

use std::collections::{HashMap, HashSet};

use super::{Plugin, ValidatedPlugins};
use crate::error::{CorralError, plugin};

/// Why a plugin cannot expose its commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// Another plugin declares the same name
    Name,
    /// This command or alias is already taken
    Command(String),
}

impl Conflict {
    /// The user-facing error for `candidate`
    pub fn into_error(self, candidate: &Plugin) -> CorralError {
        match self {
            Self::Name => plugin::ambiguous_name(&candidate.name),
            Self::Command(command) => plugin::command_conflict(&candidate.name, command),
        }
    }
}

/// Names declared by more than one plugin
pub fn duplicate_names(plugins: &[Plugin]) -> HashSet<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for plugin in plugins {
        *counts.entry(plugin.name.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// First command or alias of `plugin` that is already taken
pub fn conflicting_command(plugin: &Plugin, taken: &HashSet<String>) -> Option<String> {
    plugin
        .command_names()
        .find(|name| taken.contains(*name))
        .map(str::to_string)
}

/// Classify a plugin that is not yet part of `registry`
pub fn classify_candidate(
    candidate: &Plugin,
    registry: &ValidatedPlugins,
    builtin_commands: &HashSet<String>,
) -> Option<Conflict> {
    let others = || registry.all().filter(|p| p.directory != candidate.directory);

    if others().any(|p| p.name == candidate.name) {
        return Some(Conflict::Name);
    }

    let mut taken = builtin_commands.clone();
    for plugin in registry.valid.iter().filter(|p| p.directory != candidate.directory) {
        taken.extend(plugin.command_names().map(str::to_string));
    }
    conflicting_command(candidate, &taken).map(Conflict::Command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{PluginCommand, Source};
    use semver::Version;
    use std::path::PathBuf;

    fn plugin(name: &str, directory: &str, commands: &[(&str, &[&str])]) -> Plugin {
        Plugin {
            name: name.to_string(),
            description: String::new(),
            version: Version::new(1, 0, 0),
            directory: PathBuf::from(directory),
            binary: name.to_string(),
            source: Source::from_directory_name(directory),
            commands: commands
                .iter()
                .map(|(c, aliases)| PluginCommand {
                    name: (*c).to_string(),
                    description: String::new(),
                    aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
                })
                .collect(),
        }
    }

    fn builtin() -> HashSet<String> {
        HashSet::from(["plugin".to_string(), "help".to_string()])
    }

    #[test]
    fn test_duplicate_names() {
        let plugins = vec![
            plugin("a", "x@1", &[]),
            plugin("b", "x@2", &[]),
            plugin("a", "x@3", &[]),
        ];
        assert_eq!(duplicate_names(&plugins), HashSet::from(["a".to_string()]));
    }

    #[test]
    fn test_conflicting_command_checks_aliases() {
        let candidate = plugin("k", "x@k", &[("kubernetes", &["k8s"])]);
        let taken = HashSet::from(["k8s".to_string()]);
        assert_eq!(conflicting_command(&candidate, &taken), Some("k8s".to_string()));
        assert_eq!(conflicting_command(&candidate, &builtin()), None);
    }

    #[test]
    fn test_classify_candidate() {
        let registry = ValidatedPlugins::classify(
            vec![plugin("demo", "owner1@repo1", &[("demo", &[])])],
            &builtin(),
        );

        let same_name = plugin("demo", "owner2@repo2", &[("other", &[])]);
        assert_eq!(
            classify_candidate(&same_name, &registry, &builtin()),
            Some(Conflict::Name)
        );

        let same_command = plugin("second", "owner2@repo2", &[("demo", &[])]);
        assert_eq!(
            classify_candidate(&same_command, &registry, &builtin()),
            Some(Conflict::Command("demo".to_string()))
        );

        let builtin_clash = plugin("third", "owner3@repo3", &[("plugin", &[])]);
        assert_eq!(
            classify_candidate(&builtin_clash, &registry, &builtin()),
            Some(Conflict::Command("plugin".to_string()))
        );

        let clean = plugin("fourth", "owner4@repo4", &[("fourth", &[])]);
        assert_eq!(classify_candidate(&clean, &registry, &builtin()), None);
    }

    #[test]
    fn test_conflict_errors() {
        let candidate = plugin("demo", "o@r", &[]);
        assert!(matches!(
            Conflict::Name.into_error(&candidate),
            CorralError::AmbiguousPluginName { .. }
        ));
        assert!(matches!(
            Conflict::Command("x".to_string()).into_error(&candidate),
            CorralError::CommandConflict { .. }
        ));
    }
}
