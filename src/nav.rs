use std::path::Path;

use crate::error::AppError;
use crate::listing;
use crate::paths;

/// Sibling navigation links for a file, all root-relative with a leading
/// slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    pub previous: String,
    pub parent: String,
    pub next: String,
}

/// Compute previous/parent/next for a file among its sorted siblings.
///
/// Previous and next wrap around the file list, so in a directory with a
/// single file both point back at that file. The parent of a file directly
/// under the root is the root marker `/`.
pub fn navigate(file_path: &Path, root: &Path) -> Result<NavigationContext, AppError> {
    let containing_dir = file_path.parent().ok_or(AppError::FileNotFound)?;
    let name = file_path
        .file_name()
        .ok_or(AppError::FileNotFound)?
        .to_string_lossy();

    let listing = listing::split_entries(containing_dir)?;
    // the file was just resolved, but it may have vanished underneath us
    let index = listing
        .files
        .iter()
        .position(|file| *file == name)
        .ok_or(AppError::FileNotFound)?;
    let len = listing.files.len();

    let parent = paths::relative_display(root, containing_dir);
    let link = |file: &str| {
        if parent == "/" {
            format!("/{}", file)
        } else {
            format!("{}/{}", parent, file)
        }
    };

    Ok(NavigationContext {
        previous: link(&listing.files[(index + len - 1) % len]),
        next: link(&listing.files[(index + 1) % len]),
        parent,
    })
}
