use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::error::AppError;

/// A request path resolved inside the served root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Directory(PathBuf),
    File(PathBuf),
}

/// Join an untrusted request path onto the root without touching the
/// filesystem.
///
/// The path is rebuilt component-by-component: `..`, absolute components and
/// embedded NUL bytes are rejected outright. Containment is checked
/// component-wise, never by string prefix, so sibling roots sharing a prefix
/// (`/srv/docs` vs `/srv/docs2`) cannot be confused.
pub fn sandboxed_join(root: &Path, request_path: &str) -> Result<PathBuf, AppError> {
    let relative = request_path.trim_start_matches('/');

    if relative.is_empty() || relative == "." {
        return Ok(root.to_path_buf());
    }

    let mut result = root.to_path_buf();

    for component in Path::new(relative).components() {
        match component {
            Component::Normal(name) => {
                if name.to_string_lossy().contains('\0') {
                    warn!("path component contains NUL byte: {:?}", name);
                    return Err(AppError::InvalidPath);
                }
                result.push(name);
            }
            Component::ParentDir => {
                warn!("path traversal attempt: `..` in request path");
                return Err(AppError::InvalidPath);
            }
            Component::CurDir => continue,
            Component::RootDir | Component::Prefix(_) => {
                warn!("absolute component in request path");
                return Err(AppError::InvalidPath);
            }
        }
    }

    if !result.starts_with(root) {
        warn!("path resolution escaped root: {:?}", result);
        return Err(AppError::InvalidPath);
    }

    Ok(result)
}

/// Resolve a request path against the root and classify it.
///
/// The joined path is canonicalized and its containment re-verified, so a
/// symlink pointing outside the root is rejected rather than followed. The
/// root is expected to already be canonical (done once at startup).
pub fn resolve(root: &Path, request_path: &str) -> Result<Resolved, AppError> {
    let joined = sandboxed_join(root, request_path)?;

    if !joined.exists() {
        return Err(AppError::FileNotFound);
    }

    let canonical = joined.canonicalize()?;
    if !canonical.starts_with(root) {
        warn!(
            "symlink escape: {:?} resolved to {:?} outside {:?}",
            joined, canonical, root
        );
        return Err(AppError::InvalidPath);
    }

    if canonical.is_dir() {
        Ok(Resolved::Directory(canonical))
    } else {
        Ok(Resolved::File(canonical))
    }
}

/// Root-relative display path with a leading slash; the root itself is `/`.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path
        .strip_prefix(root)
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    if relative.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", relative)
    }
}
