use std::path::PathBuf;

use dirs_next::home_dir;

/// Expand a leading `~` (Unix or Windows separator) to the user's home directory.
///
/// Paths without a leading tilde are returned trimmed but otherwise untouched.
/// When the home directory cannot be determined the tilde is kept literally.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}
