//! Optional settings file.
//!
//! Values here are defaults that command-line flags and their environment
//! variables override. The file lives in the platform config directory
//! (`~/.config/borgrun/config.toml` on macOS and Linux) and may be absent.

use crate::constants::{CONFIG_NAME, PKG_NAME};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of the settings file.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub tools: ToolSettings,
    pub prune: PruneSettings,
    pub sync: SyncSettings,
}

/// Executable names or paths for the external tools.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    pub borg: Option<String>,
    pub rclone: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PruneSettings {
    /// Retention token, e.g. `7d`.
    pub keep: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncSettings {
    pub remote: Option<String>,
    pub root: Option<String>,
}

impl Settings {
    /// Loads settings from `explicit` if given, otherwise from the default
    /// location.
    ///
    /// # Errors
    /// Returns an error if an explicitly given file is missing, or if any
    /// file that exists cannot be read or parsed. A missing default file is
    /// not an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => match config_file() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Reads a settings file in TOML format.
    pub fn read(path: &Path) -> Result<Self> {
        let toml_str = fs::read_to_string(path)
            .with_context(|| format!("Error reading settings file '{}'", path.display()))?;
        toml::from_str(&toml_str)
            .with_context(|| format!("Error parsing settings file '{}'", path.display()))
    }
}

/// Returns the absolute path of the default settings file.
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_NAME))
}

/// Returns the configuration directory for the application, platform-specific.
#[cfg(not(target_os = "macos"))]
fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PKG_NAME))
}

/// Returns the configuration directory for the application, platform-specific.
#[cfg(target_os = "macos")]
fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(PKG_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_file_name() {
        let file = config_file().unwrap();
        assert!(file.ends_with(Path::new(PKG_NAME).join(CONFIG_NAME)));
    }

    #[test]
    fn test_read_full_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[tools]
borg = "/usr/local/bin/borg"

[prune]
keep = "14d"

[sync]
remote = "b2"
root = "backups"
"#
        )
        .unwrap();

        let settings = Settings::read(file.path()).unwrap();
        assert_eq!(settings.tools.borg.as_deref(), Some("/usr/local/bin/borg"));
        assert_eq!(settings.tools.rclone, None);
        assert_eq!(settings.prune.keep.as_deref(), Some("14d"));
        assert_eq!(settings.sync.remote.as_deref(), Some("b2"));
        assert_eq!(settings.sync.root.as_deref(), Some("backups"));
    }

    #[test]
    fn test_read_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert_eq!(Settings::read(file.path()).unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[prune]\nkeep_within = \"7d\"").unwrap();
        let err = Settings::read(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Error parsing settings file"));
    }

    #[test]
    fn test_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Settings::load(Some(&missing)).is_err());
    }
}
