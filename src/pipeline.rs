//! The backup run itself.
//!
//! A run is a fixed, ordered table of stages. Each entry says when the
//! stage applies and whether its failure ends the run; [`Pipeline::execute`]
//! walks the table once, strictly in order. Every tool call blocks until
//! the tool exits and there is no timeout: backups and syncs take as long
//! as they take.

use crate::archive::{ArchiveIdentifier, archive_prefix};
use crate::constants::COMPACT_MIN_VERSION;
use crate::error::PipelineError;
use crate::job::RunConfig;
use crate::path_util::is_readable_dir;
use crate::tool::{EngineCapabilities, StageResult, Tool};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};

/// One step of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preflight,
    Repository,
    Create,
    Prune,
    Compact,
    Sync,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Preflight => "preflight",
            Stage::Repository => "repository",
            Stage::Create => "create",
            Stage::Prune => "prune",
            Stage::Compact => "compact",
            Stage::Sync => "sync",
        };
        f.write_str(name)
    }
}

/// When a stage runs and what its failure means.
pub struct StageSpec {
    pub stage: Stage,
    pub should_run: fn(&RunConfig, &RunReport) -> bool,
    pub fatal: bool,
}

/// The run, in order.
pub const STAGES: [StageSpec; 6] = [
    StageSpec {
        stage: Stage::Preflight,
        should_run: |_, _| true,
        fatal: true,
    },
    StageSpec {
        stage: Stage::Repository,
        should_run: |_, _| true,
        fatal: true,
    },
    StageSpec {
        stage: Stage::Create,
        should_run: |_, _| true,
        fatal: true,
    },
    StageSpec {
        stage: Stage::Prune,
        should_run: |config, _| config.auto_prune,
        fatal: true,
    },
    StageSpec {
        stage: Stage::Compact,
        should_run: |config, report| {
            config.auto_compact && report.pruned && report.capabilities.supports_compact
        },
        fatal: false,
    },
    StageSpec {
        stage: Stage::Sync,
        should_run: |config, _| config.sync,
        fatal: true,
    },
];

/// What happened during a run that got past every fatal stage.
#[derive(Debug, Default)]
pub struct RunReport {
    pub engine_version: Option<String>,
    pub capabilities: EngineCapabilities,
    pub initialized: bool,
    pub archive: Option<ArchiveIdentifier>,
    pub pruned: bool,
    pub compacted: bool,
    pub synced_to: Option<String>,
    /// Failures of non-fatal stages.
    pub warnings: Vec<PipelineError>,
}

/// Process exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failure,
}

impl ExitOutcome {
    pub fn code(self) -> u8 {
        match self {
            ExitOutcome::Success => 0,
            ExitOutcome::Failure => 1,
        }
    }
}

impl From<ExitOutcome> for ExitCode {
    fn from(outcome: ExitOutcome) -> Self {
        ExitCode::from(outcome.code())
    }
}

/// Runs a whole backup and reports the outcome on the terminal.
pub fn run(config: &RunConfig, engine: Tool<'_>, sync_tool: Option<Tool<'_>>) -> ExitOutcome {
    let mut pipeline = Pipeline::new(config, engine, sync_tool);
    match pipeline.execute() {
        Ok(report) => {
            debug!(?report, "run finished");
            ExitOutcome::Success
        }
        Err(err) => {
            match std::error::Error::source(&err) {
                Some(source) => eprintln!("{err}: {source}"),
                None => eprintln!("{err}"),
            }
            if let Some(guidance) = err.guidance() {
                eprintln!("{guidance}");
            }
            ExitOutcome::Failure
        }
    }
}

/// Drives the stages of one run against borg and rclone.
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    engine: Tool<'a>,
    sync_tool: Option<Tool<'a>>,
    report: RunReport,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a RunConfig, engine: Tool<'a>, sync_tool: Option<Tool<'a>>) -> Self {
        Self {
            config,
            engine,
            sync_tool,
            report: RunReport::default(),
        }
    }

    /// Executes every applicable stage in order.
    ///
    /// # Errors
    /// Returns the first failure of a fatal stage. Failures of non-fatal
    /// stages are collected in [`RunReport::warnings`] instead.
    pub fn execute(&mut self) -> Result<RunReport, PipelineError> {
        for spec in &STAGES {
            if !(spec.should_run)(self.config, &self.report) {
                debug!(stage = %spec.stage, "skipped");
                if spec.stage == Stage::Compact && self.compact_gated_out() {
                    self.print_compact_unsupported();
                }
                continue;
            }

            info!(stage = %spec.stage, "running");
            match self.run_stage(spec.stage) {
                Ok(()) => {}
                Err(err) if !spec.fatal => {
                    warn!(stage = %spec.stage, error = %err, "non-fatal stage failed");
                    eprintln!("warning: {err}, continuing");
                    self.report.warnings.push(err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(std::mem::take(&mut self.report))
    }

    fn run_stage(&mut self, stage: Stage) -> Result<(), PipelineError> {
        match stage {
            Stage::Preflight => self.preflight(),
            Stage::Repository => self.ensure_repository(),
            Stage::Create => self.create(),
            Stage::Prune => self.prune(),
            Stage::Compact => self.compact(),
            Stage::Sync => self.sync(),
        }
    }

    fn preflight(&mut self) -> Result<(), PipelineError> {
        let result = self
            .engine
            .version()
            .map_err(|source| PipelineError::EngineMissing {
                program: self.engine.name(),
                source,
            })?;
        self.echo(&result);

        if result.success {
            let version = result.stdout.trim().to_string();
            self.report.capabilities = EngineCapabilities::from_version_output(&version);
            debug!(%version, capabilities = ?self.report.capabilities, "engine detected");
            self.report.engine_version = Some(version);
        } else {
            warn!(program = %self.engine.name(), "version query failed, optional features disabled");
        }

        if self.config.sync {
            let Some(sync_tool) = self.sync_tool else {
                return Err(PipelineError::SyncToolMissing {
                    program: crate::constants::DEFAULT_RCLONE.to_string(),
                    source: None,
                });
            };
            let result = sync_tool
                .version()
                .map_err(|source| PipelineError::SyncToolMissing {
                    program: sync_tool.name(),
                    source: Some(source),
                })?;
            self.echo(&result);
        }
        Ok(())
    }

    fn ensure_repository(&mut self) -> Result<(), PipelineError> {
        let config = self.config;
        let repo = &config.repo_path;
        if is_readable_dir(repo) {
            debug!(repo = %repo.display(), "repository exists");
            return Ok(());
        }
        if !config.auto_init {
            return Err(PipelineError::RepoMissingNoInit(repo.clone()));
        }

        let init_failed = |source| PipelineError::RepoInitFailed {
            path: repo.clone(),
            source,
        };
        let created = missing_ancestors(repo);
        fs::create_dir_all(repo).map_err(|e| {
            remove_created(&created);
            init_failed(Some(e))
        })?;
        let result = match self
            .engine
            .run([OsString::from("init"), "-e=none".into(), repo.into()])
        {
            Ok(result) => result,
            Err(e) => {
                remove_created(&created);
                return Err(init_failed(Some(e)));
            }
        };
        self.echo(&result);
        if !result.success {
            // An empty directory left behind would pass as an initialized
            // repository on the next run.
            remove_created(&created);
            return Err(init_failed(None));
        }

        println!("initialized repo {}", repo.display());
        self.report.initialized = true;
        Ok(())
    }

    fn create(&mut self) -> Result<(), PipelineError> {
        let archive = ArchiveIdentifier::generate(&self.config.archive_name);
        let mut location = self.config.repo_path.clone().into_os_string();
        location.push(format!("::{archive}"));

        let mut args = vec![OsString::from("create"), "--stats".into(), location];
        args.extend(self.config.paths.iter().map(OsString::from));

        let result = self
            .engine
            .run(args)
            .map_err(|e| PipelineError::ArchiveCreateFailed(Some(e)))?;
        self.echo(&result);
        if !result.success {
            return Err(PipelineError::ArchiveCreateFailed(None));
        }

        println!("created archive {archive}");
        self.report.archive = Some(archive);
        Ok(())
    }

    fn prune(&mut self) -> Result<(), PipelineError> {
        let Some(retention) = self.config.retention else {
            return Err(PipelineError::PruneFailed(None));
        };
        let prefix = archive_prefix(&self.config.archive_name);

        // keep-last=1 together with keep-within always keeps the newest
        // archive, even when it is older than the window.
        let result = self
            .engine
            .run([
                OsString::from("prune"),
                self.config.repo_path.clone().into(),
                "--stats".into(),
                format!("--prefix={prefix}").into(),
                "--keep-last=1".into(),
                format!("--keep-within={retention}").into(),
            ])
            .map_err(|e| PipelineError::PruneFailed(Some(e)))?;
        self.echo(&result);
        if !result.success {
            return Err(PipelineError::PruneFailed(None));
        }

        println!("pruned archives of {prefix}* older than {retention}");
        self.report.pruned = true;
        Ok(())
    }

    fn compact(&mut self) -> Result<(), PipelineError> {
        let result = self
            .engine
            .run([
                OsString::from("compact"),
                "--cleanup-commits".into(),
                self.config.repo_path.clone().into(),
            ])
            .map_err(|e| PipelineError::CompactFailed(Some(e)))?;
        self.echo(&result);
        if !result.success {
            return Err(PipelineError::CompactFailed(None));
        }

        println!("compacted repo");
        self.report.compacted = true;
        Ok(())
    }

    fn sync(&mut self) -> Result<(), PipelineError> {
        let Some(target) = self.config.sync_target() else {
            return Err(PipelineError::SyncFailed {
                target: String::from("<no remote>"),
                source: None,
            });
        };
        let Some(sync_tool) = self.sync_tool else {
            return Err(PipelineError::SyncToolMissing {
                program: crate::constants::DEFAULT_RCLONE.to_string(),
                source: None,
            });
        };

        let result = sync_tool
            .run([
                OsString::from("sync"),
                self.config.repo_path.clone().into(),
                target.clone().into(),
            ])
            .map_err(|e| PipelineError::SyncFailed {
                target: target.clone(),
                source: Some(e),
            })?;
        self.echo(&result);
        if !result.success {
            return Err(PipelineError::SyncFailed {
                target,
                source: None,
            });
        }

        println!("synced repo to {target}");
        self.report.synced_to = Some(target);
        Ok(())
    }

    fn compact_gated_out(&self) -> bool {
        self.config.auto_compact && self.report.pruned && !self.report.capabilities.supports_compact
    }

    fn print_compact_unsupported(&self) {
        let (major, minor, patch) = COMPACT_MIN_VERSION;
        let found = self.report.engine_version.as_deref().unwrap_or("unknown version");
        println!("skipping compact: needs {major}.{minor}.{patch} or newer, found {found}");
    }

    /// Echoes a tool's diagnostic stream in verbose mode.
    fn echo(&self, result: &StageResult) {
        if self.config.verbose && !result.stderr.trim().is_empty() {
            eprintln!("{}", result.stderr.trim_end());
        }
    }
}

/// Directories `create_dir_all(path)` would create, deepest first.
fn missing_ancestors(path: &Path) -> Vec<PathBuf> {
    path.ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .take_while(|p| fs::symlink_metadata(p).is_err())
        .map(Path::to_path_buf)
        .collect()
}

/// Removes directories listed by `missing_ancestors`, stopping at the
/// first one that is gone or no longer empty.
fn remove_created(created: &[PathBuf]) {
    for dir in created {
        if fs::remove_dir(dir).is_err() {
            break;
        }
    }
}
