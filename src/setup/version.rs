//! Config version tracking.
//!
//! The first line of the config file records which chatkey version wrote it. On startup
//! the line is compared with the running binary to decide whether setup must run.

use anyhow::anyhow;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

/// Current application version from Cargo.toml
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Represents a semantic version (major.minor.patch)
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct SemanticVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

impl SemanticVersion {
    fn parse(version_str: &str) -> anyhow::Result<Self> {
        let parts: Vec<u32> = version_str
            .trim()
            .split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| anyhow!("Invalid version component '{part}' in '{version_str}'"))
            })
            .collect::<anyhow::Result<_>>()?;

        match parts.as_slice() {
            [major, minor, patch] => Ok(Self {
                major: *major,
                minor: *minor,
                patch: *patch,
            }),
            _ => Err(anyhow!(
                "Invalid version format: '{version_str}'. Expected 'major.minor.patch'"
            )),
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// What startup has to do with the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupState {
    /// No config file yet; write the default template
    Missing,
    /// Config was written by an older (or unversioned) chatkey
    Outdated(String),
    /// Config version matches or is newer than the binary
    UpToDate,
}

/// Extracts the version from a `config_version = "X.Y.Z"` first line.
fn parse_version_line(content: &str) -> anyhow::Result<Option<String>> {
    let Some(first_line) = content.lines().next() else {
        return Ok(None);
    };

    let regex = Regex::new(r#"^\s*config_version\s*=\s*"([^"]+)""#)?;
    Ok(regex
        .captures(first_line)
        .map(|caps| caps[1].to_string()))
}

/// Decides whether setup must run for the config at `config_path`.
///
/// # Errors
/// - If the file exists but cannot be read
/// - If the recorded version is not a valid semantic version
pub fn check_setup_needed(config_path: &Path) -> anyhow::Result<SetupState> {
    if !config_path.exists() {
        return Ok(SetupState::Missing);
    }

    let content = std::fs::read_to_string(config_path)?;
    compare_with_current(parse_version_line(&content)?, CURRENT_VERSION)
}

fn compare_with_current(
    config_version: Option<String>,
    current_version: &str,
) -> anyhow::Result<SetupState> {
    let Some(config_version) = config_version else {
        return Ok(SetupState::Outdated("unknown (legacy config)".to_string()));
    };

    let config_parsed = SemanticVersion::parse(&config_version)?;
    let current_parsed = SemanticVersion::parse(current_version)?;

    match config_parsed.cmp(&current_parsed) {
        Ordering::Less => Ok(SetupState::Outdated(config_version)),
        Ordering::Equal => Ok(SetupState::UpToDate),
        Ordering::Greater => {
            tracing::warn!(
                "Config version {config_parsed} is newer than app version {current_parsed}"
            );
            Ok(SetupState::UpToDate)
        }
    }
}

/// Returns the config line recording the running version.
pub fn version_line() -> String {
    format!(r#"config_version = "{CURRENT_VERSION}""#)
}

/// Replaces (or adds) the `config_version` first line, keeping all other content.
pub fn update_config_version(config_path: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(config_path)?;
    std::fs::write(config_path, with_version_line(&content))?;
    Ok(())
}

fn with_version_line(content: &str) -> String {
    let body: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim().starts_with("config_version"))
        .collect();

    if body.is_empty() {
        version_line()
    } else {
        format!("{}\n{}\n", version_line(), body.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_version_ordering() {
        let v1 = SemanticVersion::parse("0.0.9").unwrap();
        let v2 = SemanticVersion::parse("0.1.0").unwrap();
        let v3 = SemanticVersion::parse("1.0.0").unwrap();

        assert!(v1 < v2);
        assert!(v2 < v3);
        assert_eq!(v2.to_string(), "0.1.0");
    }

    #[test]
    fn test_invalid_version_format() {
        assert!(SemanticVersion::parse("0.1").is_err());
        assert!(SemanticVersion::parse("0.1.0.1").is_err());
        assert!(SemanticVersion::parse("one.two.three").is_err());
    }

    #[test]
    fn test_parse_version_line() {
        assert_eq!(
            parse_version_line("config_version = \"0.1.0\"\n[validator]").unwrap(),
            Some("0.1.0".to_string())
        );
        assert_eq!(parse_version_line("# config_version = \"0.1.0\"").unwrap(), None);
        assert_eq!(parse_version_line("").unwrap(), None);
    }

    #[test]
    fn test_compare_with_current() {
        assert_eq!(
            compare_with_current(Some("0.0.5".to_string()), "0.1.0").unwrap(),
            SetupState::Outdated("0.0.5".to_string())
        );
        assert_eq!(
            compare_with_current(Some("0.1.0".to_string()), "0.1.0").unwrap(),
            SetupState::UpToDate
        );
        assert_eq!(
            compare_with_current(Some("0.2.0".to_string()), "0.1.0").unwrap(),
            SetupState::UpToDate
        );
        assert!(matches!(
            compare_with_current(None, "0.1.0").unwrap(),
            SetupState::Outdated(_)
        ));
    }

    #[test]
    fn test_update_config_version_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chatkey.toml");
        std::fs::write(&path, "config_version = \"0.0.1\"\n[validator]\ntimeout_secs = 5\n").unwrap();

        update_config_version(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(&version_line()));
        assert!(content.contains("timeout_secs = 5"));
        assert_eq!(check_setup_needed(&path).unwrap(), SetupState::UpToDate);
    }

    #[test]
    fn test_missing_config_needs_setup() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            check_setup_needed(&dir.path().join("absent.toml")).unwrap(),
            SetupState::Missing
        );
    }
}
