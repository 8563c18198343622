//! Project discovery: the immediate subdirectories of the configured root.

use std::fs;
use std::path::Path;

use tracing::warn;

/// List the names of the directories directly under `root`, sorted by name.
///
/// An unreadable root is logged and treated as empty. Symlinks are not
/// followed, so a link to a directory is not offered as a project.
pub fn list_directories(root: &Path) -> Vec<String> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "Error reading project root");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Skipping unreadable entry");
                    return None;
                }
            };
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            is_dir.then(|| entry.file_name().to_string_lossy().into_owned())
        })
        .collect();

    names.sort();
    names
}
