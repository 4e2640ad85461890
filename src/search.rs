use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Find the first file named `file_name` anywhere below a directory named
/// `dir_name` in the tree under `root`.
///
/// Traversal is depth-first with each directory's children visited in
/// lexicographic order, so "first" is deterministic. Multiple matches are
/// resolved by first-encountered, by policy. Subtrees that cannot be read
/// are skipped rather than failing the search.
///
/// The returned path is relative to `root`, suitable as a redirect target.
pub fn find_file(root: &Path, dir_name: &str, file_name: &str) -> Option<PathBuf> {
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() || entry.file_name().to_string_lossy() != file_name {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        // an intermediate component must match the requested directory;
        // the root itself does not count
        let mut components = relative.components();
        components.next_back();
        if components.any(|c| c.as_os_str().to_string_lossy() == dir_name) {
            return Some(relative.to_path_buf());
        }
    }

    None
}
