//! Gitignore-aware file listing.

use std::path::Path;

use strata_core::{Result, StrataError};

/// List files under `root`, honoring `.gitignore`, sorted by path.
///
/// Paths are relative to `root` with forward slashes, matching the paths
/// that appear in SCM logs and cloc reports so joins line up.
///
/// # Errors
///
/// Returns [`StrataError::FileNotFound`] when `root` does not exist.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use strata_loc::list_files;
///
/// let files = list_files(Path::new(".")).unwrap();
/// assert!(files.iter().all(|f| !f.starts_with('/')));
/// ```
pub fn list_files(root: &Path) -> Result<Vec<String>> {
    if !root.exists() {
        return Err(StrataError::FileNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    // honor .gitignore even when the tree is not (yet) a git repository
    let walker = ignore::WalkBuilder::new(root).require_git(false).build();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        files.push(rel.to_string_lossy().replace('\\', "/"));
    }
    files.sort();
    Ok(files)
}
