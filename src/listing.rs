use std::io;
use std::path::Path;

/// Immediate entries of a directory, partitioned and sorted.
///
/// `files` and `dirs` are disjoint and together cover every entry. Both are
/// sorted ascending by Unicode codepoint; the same order is used for sibling
/// navigation, so listing and previous/next links always agree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
}

/// List a directory's immediate children, directories apart from the rest.
///
/// A symlink is classified by its target: symlink-to-directory lands in
/// `dirs`, anything else (including broken links) in `files`.
pub fn split_entries(path: &Path) -> io::Result<DirectoryListing> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if entry.path().is_dir() {
            dirs.push(name);
        } else {
            files.push(name);
        }
    }

    files.sort();
    dirs.sort();

    Ok(DirectoryListing { files, dirs })
}
