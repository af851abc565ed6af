use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

fn traversal(path: &Path, reason: &'static str) -> StorageError {
    StorageError::PathTraversalAttempt {
        message: path.display().to_string().into(),
        context: Some(reason.into()),
    }
}

/// Collapses `.` and `..` lexically; `..` may never climb above the root.
fn normalize_relative(path: &Path) -> Result<PathBuf, StorageError> {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::Normal(segment) => out.push(segment),
            Component::ParentDir => {
                if !out.pop() {
                    return Err(traversal(path, "Path attempted to escape sandbox via '..'"));
                }
            },
            Component::RootDir | Component::Prefix(_) => {
                return Err(traversal(path, "Absolute paths are not allowed in sandbox"));
            },
        }
    }

    if out.as_os_str().is_empty() {
        return Err(traversal(path, "Empty key"));
    }

    Ok(out)
}

/// Joins `path` to `root` and proves the result stays inside the sandbox.
///
/// Existing targets are canonicalized. For targets that do not exist yet, the
/// closest existing ancestor is canonicalized instead, which still catches
/// symlinked directories pointing outside the root.
pub(crate) fn resolve_path(root: &Path, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    let joined = root.join(normalize_relative(path)?);

    let mut ancestor = Some(joined.as_path());
    while let Some(candidate) = ancestor {
        if candidate == root {
            return Ok(joined.clone());
        }

        match candidate.canonicalize() {
            Ok(canonical) if canonical.starts_with(root) => {
                return Ok(if candidate == joined { canonical } else { joined.clone() });
            },
            Ok(_) => return Err(traversal(candidate, "Resolved outside sandbox (symlink?)")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ancestor = candidate.parent(),
            Err(e) => {
                return Err(StorageError::Io {
                    source: e,
                    context: Some(format!("Failed to verify {}", candidate.display()).into()),
                });
            },
        }
    }

    Err(traversal(&joined, "No ancestor inside sandbox"))
}
