//! The validated description of one backup run.

use crate::cli::Cli;
use crate::constants::{DEFAULT_BORG, DEFAULT_RCLONE, DEFAULT_RCLONE_ROOT};
use crate::error::ValidationError;
use crate::path_util::expand_home;
use crate::settings::Settings;
use crate::timeframe::{self, NormalizedTimeframe};
use std::path::{Path, PathBuf};

/// Everything the pipeline needs to know about a run. Built once, then
/// read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub verbose: bool,
    pub auto_init: bool,
    /// Archive name prefix, unique per backup set.
    pub archive_name: String,
    pub repo_path: PathBuf,
    pub auto_compact: bool,
    pub auto_prune: bool,
    /// Present iff `auto_prune`.
    pub retention: Option<NormalizedTimeframe>,
    pub sync: bool,
    /// Always present when `sync` is set.
    pub rclone_remote: Option<String>,
    pub rclone_root: String,
    pub paths: Vec<PathBuf>,
}

impl RunConfig {
    /// Merges command-line values with settings-file defaults and checks
    /// the invariants between them.
    ///
    /// # Errors
    /// Returns a [`ValidationError`] for a malformed retention token, a
    /// missing retention while pruning, `--sync` without a remote, an empty
    /// archive name or no paths.
    pub fn resolve(cli: &Cli, settings: &Settings) -> Result<Self, ValidationError> {
        if cli.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if cli.paths.is_empty() {
            return Err(ValidationError::NoPaths);
        }

        let auto_prune = !cli.no_prune;
        let retention = if auto_prune {
            let token = cli
                .keep
                .as_deref()
                .or(settings.prune.keep.as_deref())
                .ok_or(ValidationError::MissingRetention)?;
            Some(timeframe::normalize(token)?)
        } else {
            None
        };

        let rclone_remote = cli
            .rclone_remote
            .clone()
            .or_else(|| settings.sync.remote.clone())
            .filter(|remote| !remote.is_empty());
        if cli.sync && rclone_remote.is_none() {
            return Err(ValidationError::MissingRemote);
        }
        let rclone_root = cli
            .rclone_root
            .clone()
            .or_else(|| settings.sync.root.clone())
            .unwrap_or_else(|| DEFAULT_RCLONE_ROOT.to_string());

        Ok(Self {
            verbose: cli.verbose,
            auto_init: !cli.no_init,
            archive_name: cli.name.clone(),
            repo_path: expand_home(&cli.repo),
            auto_compact: !cli.no_compact,
            auto_prune,
            retention,
            sync: cli.sync,
            rclone_remote,
            rclone_root,
            paths: cli.paths.clone(),
        })
    }

    /// The rclone destination `<remote>:<root>/<name>`, if a remote is set.
    pub fn sync_target(&self) -> Option<String> {
        self.rclone_remote
            .as_ref()
            .map(|remote| format!("{remote}:{}/{}", self.rclone_root, self.archive_name))
    }
}

/// Executables used for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub borg: PathBuf,
    pub rclone: PathBuf,
}

impl ToolPaths {
    pub fn resolve(cli: &Cli, settings: &Settings) -> Self {
        Self {
            borg: pick(cli.borg_bin.as_deref(), settings.tools.borg.as_deref(), DEFAULT_BORG),
            rclone: pick(
                cli.rclone_bin.as_deref(),
                settings.tools.rclone.as_deref(),
                DEFAULT_RCLONE,
            ),
        }
    }
}

fn pick(flag: Option<&Path>, setting: Option<&str>, default: &str) -> PathBuf {
    let path = flag.or(setting.map(Path::new)).unwrap_or(Path::new(default));
    expand_home(path)
}
