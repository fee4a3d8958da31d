//! Command-line interface definition for borgrun.

use clap::Parser;
use std::path::PathBuf;

/// Back up paths into a borg repository, prune and compact it, and
/// optionally mirror it to an rclone remote.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Echo the diagnostic output of borg and rclone.
    #[arg(short, long)]
    pub verbose: bool,

    /// Don't automatically init the borg repo if it doesn't already exist.
    #[arg(long)]
    pub no_init: bool,

    /// Name for backups, unique to the repo.
    #[arg(short = 'N', long)]
    pub name: String,

    /// Path to the borg repo.
    #[arg(short = 'R', long, env = "BORGRUN_REPO")]
    pub repo: PathBuf,

    /// Don't compact the repo after pruning.
    #[arg(long)]
    pub no_compact: bool,

    /// Don't prune old archives.
    #[arg(long)]
    pub no_prune: bool,

    /// Keep archives within this timeframe, e.g. 12h, 7d, 4w, 6m, 1y.
    /// Required unless --no-prune is given.
    #[arg(short = 'K', long, env = "BORGRUN_KEEP")]
    pub keep: Option<String>,

    /// Mirror the repo to an rclone remote after the backup.
    #[arg(short = 'S', long)]
    pub sync: bool,

    /// rclone remote to sync to.
    #[arg(long, env = "BORGRUN_RCLONE_REMOTE")]
    pub rclone_remote: Option<String>,

    /// Root path on the rclone remote [default: .]
    #[arg(long, env = "BORGRUN_RCLONE_ROOT")]
    pub rclone_root: Option<String>,

    /// borg executable to use [default: borg]
    #[arg(long, env = "BORGRUN_BORG")]
    pub borg_bin: Option<PathBuf>,

    /// rclone executable to use [default: rclone]
    #[arg(long, env = "BORGRUN_RCLONE")]
    pub rclone_bin: Option<PathBuf>,

    /// Settings file to read instead of the default one.
    #[arg(long, env = "BORGRUN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Files and directories to back up.
    #[arg(required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,
}
