//! External tool invocation.
//!
//! Borg and rclone are driven the same way: spawn, wait, collect both
//! output streams and the exit status. [`Invoker`] is the single seam for
//! that so the pipeline can be exercised without real binaries.

use crate::constants::COMPACT_MIN_VERSION;
use std::ffi::{OsStr, OsString};
use std::io;
use std::process::Command;
use tracing::debug;

/// Outcome of one external tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl StageResult {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs an external program to completion.
pub trait Invoker {
    /// Runs `program` with `args` and waits for it to exit.
    ///
    /// # Errors
    /// Returns an error only when the program could not be started at all
    /// (not installed, not executable). A program that runs and exits
    /// non-zero is reported through [`StageResult::success`].
    fn invoke(&self, program: &OsStr, args: &[OsString]) -> io::Result<StageResult>;
}

/// [`Invoker`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInvoker;

impl Invoker for ProcessInvoker {
    fn invoke(&self, program: &OsStr, args: &[OsString]) -> io::Result<StageResult> {
        debug!(program = %program.to_string_lossy(), ?args, "invoking");
        let output = Command::new(program).args(args).output()?;
        debug!(status = %output.status, "finished");
        Ok(StageResult {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// A program bound to the [`Invoker`] that runs it.
#[derive(Clone, Copy)]
pub struct Tool<'a> {
    program: &'a OsStr,
    invoker: &'a dyn Invoker,
}

impl<'a> Tool<'a> {
    pub fn new(program: &'a OsStr, invoker: &'a dyn Invoker) -> Self {
        Self { program, invoker }
    }

    /// Program name for messages.
    pub fn name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Runs the tool with `args`.
    ///
    /// # Errors
    /// Returns an error if the program could not be started.
    pub fn run<I, S>(&self, args: I) -> io::Result<StageResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        self.invoker.invoke(self.program, &args)
    }

    /// Runs the tool's `-V` version query.
    ///
    /// # Errors
    /// Returns an error if the program could not be started.
    pub fn version(&self) -> io::Result<StageResult> {
        self.run(["-V"])
    }
}

/// What the installed engine is able to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineCapabilities {
    pub supports_compact: bool,
}

impl EngineCapabilities {
    /// Derives capabilities from the engine's `-V` output, e.g. `borg 1.4.0`.
    ///
    /// An unparsable version string yields no optional capabilities.
    pub fn from_version_output(output: &str) -> Self {
        let supports_compact = parse_version(output).is_some_and(|v| v >= COMPACT_MIN_VERSION);
        Self { supports_compact }
    }
}

/// Extracts `(major, minor, patch)` from a `"<name> <version>"` string.
///
/// Missing minor/patch components count as 0. A pre-release suffix such
/// as `1.4.0b2` is read up to its first non-digit.
pub fn parse_version(output: &str) -> Option<(u32, u32, u32)> {
    let version = output.split_whitespace().last()?;
    let version = version.strip_prefix('v').unwrap_or(version);

    let mut parts = version.split('.').map(leading_number);
    let major = parts.next()??;
    let minor = parts.next().unwrap_or(Some(0))?;
    let patch = parts.next().unwrap_or(Some(0)).unwrap_or(0);
    Some((major, minor, patch))
}

fn leading_number(part: &str) -> Option<u32> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}
