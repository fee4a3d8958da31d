use std::fs;
use std::path::{Path, PathBuf};

/// Expands a leading `~` or `$HOME` to the user's home directory.
///
/// Used for values that do not pass through a shell, such as settings
/// file entries and environment variables.
pub fn expand_home(input: &Path) -> PathBuf {
    let Some(s) = input.to_str() else {
        return input.to_path_buf();
    };
    let rest = if s == "~" || s == "$HOME" {
        ""
    } else if let Some(rest) = s.strip_prefix("~/") {
        rest
    } else if let Some(rest) = s.strip_prefix("$HOME/") {
        rest
    } else {
        return input.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => input.to_path_buf(),
    }
}

/// Returns true if `path` exists and is a directory we can list.
pub fn is_readable_dir(path: &Path) -> bool {
    fs::read_dir(path).is_ok()
}
