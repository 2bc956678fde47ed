//! Plugin specifier parsing
//!
//! A specifier identifies a plugin either by repository or by name:
//! - Repository shorthand: `owner/repo`, `owner/repo/`
//! - GitHub URLs: `https://github.com/owner/repo`, `github.com/owner/repo`, `https://www.github.com/owner/repo`
//! - Any repository form with a version: `owner/repo@1.2.3`, `owner/repo/@v1`, `owner/repo@latest`
//! - Bare plugin name: `my-plugin`, optionally with a version: `my-plugin@1.0.0`

use semver::Version;

use crate::error::{Result, specifier};

const HOST_PREFIXES: &[&str] = &["https://", "http://"];
const WWW_PREFIX: &str = "www.";
const GITHUB_PREFIX: &str = "github.com/";
const LATEST: &str = "latest";

/// A parsed plugin specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSpecifier {
    /// A GitHub repository, optionally pinned to a release version
    Repository {
        owner: String,
        repo: String,
        version: Option<Version>,
    },
    /// A plugin looked up by its manifest name among installed plugins
    Name {
        name: String,
        version: Option<Version>,
    },
}

impl PluginSpecifier {
    /// Parse a specifier string
    ///
    /// A string without a `/` is a plugin name. Anything else must reduce to exactly one
    /// `owner/repo` pair once the host prefix and a single trailing slash are removed.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(specifier::invalid(input, "specifier is empty"));
        }

        let (location, version) = match input.split_once('@') {
            Some((location, version_part)) => (location, parse_version(input, version_part)?),
            None => (input, None),
        };

        let (stripped, had_prefix) = strip_host_prefix(location);

        if !had_prefix && !stripped.contains('/') {
            if !is_valid_segment(stripped) {
                return Err(specifier::invalid(input, "plugin name contains invalid characters"));
            }
            return Ok(Self::Name {
                name: stripped.to_string(),
                version,
            });
        }

        let path = stripped.strip_suffix('/').unwrap_or(stripped);
        let mut parts = path.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if is_valid_segment(owner) && is_valid_segment(repo) => {
                Ok(Self::Repository {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    version,
                })
            }
            _ => Err(specifier::invalid(
                input,
                r#"it needs to have the format "<github-owner>/<github-repository-name>""#,
            )),
        }
    }

    /// Parse a specifier used to look up an installed plugin
    ///
    /// Falls back to treating the whole input as a plugin name when it does not parse as a
    /// specifier, so names that happen to contain `@` can still be found.
    pub fn parse_lookup(input: &str) -> Self {
        Self::parse(input).unwrap_or_else(|_| Self::Name {
            name: input.trim().to_string(),
            version: None,
        })
    }

    /// Requested version, if any
    pub fn version(&self) -> Option<&Version> {
        match self {
            Self::Repository { version, .. } | Self::Name { version, .. } => version.as_ref(),
        }
    }
}

impl std::fmt::Display for PluginSpecifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let base = match self {
            Self::Repository { owner, repo, .. } => format!("{owner}/{repo}"),
            Self::Name { name, .. } => name.clone(),
        };
        match self.version() {
            Some(v) => write!(f, "{base}@{v}"),
            None => write!(f, "{base}"),
        }
    }
}

/// Strip `https://`, `http://`, `www.` and `github.com/` prefixes
///
/// A scheme or `www.` is only meaningful in front of `github.com/`; when the host is missing
/// the input is returned unchanged so the owner/repo check rejects it.
fn strip_host_prefix(location: &str) -> (&str, bool) {
    let mut rest = location;
    for prefix in HOST_PREFIXES {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            rest = stripped;
            break;
        }
    }
    if let Some(stripped) = rest.strip_prefix(WWW_PREFIX) {
        rest = stripped;
    }
    match rest.strip_prefix(GITHUB_PREFIX) {
        Some(stripped) => (stripped, true),
        None if rest.len() == location.len() => (location, false),
        None => (location, true),
    }
}

fn parse_version(input: &str, version: &str) -> Result<Option<Version>> {
    if version.is_empty() {
        return Err(specifier::invalid(input, "missing version after '@'"));
    }
    if version == LATEST {
        return Ok(None);
    }
    parse_lenient(version).map(Some).ok_or_else(|| {
        specifier::invalid(
            input,
            format!(
                r#"the specified version "{version}" is invalid, it needs to follow the rules of Semantic Versioning"#
            ),
        )
    })
}

/// Owner, repository and plugin names: word characters, `.` and `-`
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Parse a version the way release tags are written in the wild
///
/// Accepts an optional leading `v` and fills in missing minor/patch components, so `v1`,
/// `1.2` and `v1.2.3-rc.1` are all valid. Returns `None` for anything else.
pub fn parse_lenient(input: &str) -> Option<Version> {
    let trimmed = input.strip_prefix('v').unwrap_or(input);
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }

    let core_end = trimmed.find(['-', '+']).unwrap_or(trimmed.len());
    let (core, suffix) = trimmed.split_at(core_end);
    let components: Vec<&str> = core.split('.').collect();
    if components.is_empty()
        || components.len() > 2
        || components
            .iter()
            .any(|c| c.is_empty() || !c.chars().all(|ch| ch.is_ascii_digit()))
    {
        return None;
    }

    let padded = match components.as_slice() {
        [major] => format!("{major}.0.0{suffix}"),
        [major, minor] => format!("{major}.{minor}.0{suffix}"),
        _ => return None,
    };
    Version::parse(&padded).ok()
}
