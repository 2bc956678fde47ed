//! Operating system and architecture naming
//!
//! Release assets name their target platform in many ways (`x86_64`, `amd64`, `x64`,
//! `darwin`, `macos`, ...). Both the host platform and asset names are normalized to one
//! canonical token per OS and architecture before matching.

use std::fmt;

/// Canonical OS names with the aliases accepted in asset names
const OS_ALIASES: &[(&str, &[&str])] = &[
    ("linux", &["linux"]),
    ("darwin", &["darwin", "macos", "osx", "apple"]),
    ("windows", &["windows", "win", "win64", "win32"]),
    ("freebsd", &["freebsd"]),
];

/// Canonical architecture names with the aliases accepted in asset names
const ARCH_ALIASES: &[(&str, &[&str])] = &[
    ("amd64", &["amd64", "x64", "x86_64"]),
    ("arm64", &["arm64", "aarch64"]),
    ("386", &["386", "i386", "i686", "x86"]),
    ("arm", &["arm", "armv7", "armv7l", "armhf"]),
];

/// Target platform for an asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: canonical(OS_ALIASES, os).unwrap_or(os).to_string(),
            arch: canonical(ARCH_ALIASES, arch).unwrap_or(arch).to_string(),
        }
    }

    /// The platform this binary was compiled for
    pub fn current() -> Self {
        let os = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        Self::new(os, std::env::consts::ARCH)
    }

    /// Whether an asset file name targets this platform
    pub fn matches_asset_name(&self, name: &str) -> bool {
        let tokens = tokenize(name);
        let has = |aliases: &[(&str, &[&str])], wanted: &str| {
            tokens
                .iter()
                .any(|token| canonical(aliases, token) == Some(wanted))
        };
        has(OS_ALIASES, &self.os) && has(ARCH_ALIASES, &self.arch)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.os, self.arch)
    }
}

fn canonical<'a>(aliases: &[(&'a str, &[&str])], token: &str) -> Option<&'a str> {
    let token = token.to_ascii_lowercase();
    aliases
        .iter()
        .find(|(_, names)| names.contains(&token.as_str()))
        .map(|(name, _)| *name)
}

/// Split an asset name on separators, keeping `x86_64` and `x86-64` together
fn tokenize(name: &str) -> Vec<String> {
    let lower = name
        .to_ascii_lowercase()
        .replace("x86_64", "amd64")
        .replace("x86-64", "amd64");
    lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
