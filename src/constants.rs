/// Package name.
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
/// Default settings file name.
pub const CONFIG_NAME: &str = "config.toml";

/// Default backup engine executable.
pub const DEFAULT_BORG: &str = "borg";
/// Default sync tool executable.
pub const DEFAULT_RCLONE: &str = "rclone";
/// Default root directory on the sync remote.
pub const DEFAULT_RCLONE_ROOT: &str = ".";

/// Oldest engine release whose `compact` we rely on.
pub const COMPACT_MIN_VERSION: (u32, u32, u32) = (1, 4, 0);

/// Number of random bytes in an archive suffix (12 hex characters).
pub const ARCHIVE_SUFFIX_BYTES: usize = 6;

pub const BORG_INSTALL_URL: &str = "https://borgbackup.readthedocs.io/en/stable/installation.html";
pub const RCLONE_INSTALL_URL: &str = "https://rclone.org/install/";

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "BORGRUN_LOG";
