use crate::TMP_MARKER;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::WalkDir;

/// Temp files younger than this may still belong to a live writer.
const STALE_AFTER: Duration = Duration::from_secs(300);

pub(crate) async fn purge_tmp(root: &Path) {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now)).await {
        Ok((removed, failed)) if removed > 0 || failed > 0 => {
            info!(removed, failed, "Cleaned up temporary files");
        },
        Ok(_) => {},
        Err(e) => error!(error = %e, "Temp file cleanup task panicked"),
    }
}

fn remove_stale(root: &Path, now: SystemTime) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    for entry in WalkDir::new(root).into_iter().flatten() {
        if !entry.file_type().is_file() || !is_tmp(entry.path()) || !is_stale(entry.path(), now) {
            continue;
        }
        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Failed to remove temp file");
                failed += 1;
            },
        }
    }

    (removed, failed)
}

fn is_tmp(path: &Path) -> bool {
    path.file_name().and_then(|name| name.to_str()).is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(path: &Path, now: SystemTime) -> bool {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > STALE_AFTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_marked_files_are_temporary() {
        assert!(is_tmp(Path::new("snapshots/ledger.json.uniregtmp.3")));
        assert!(!is_tmp(Path::new("snapshots/ledger.json")));
    }

    #[test]
    fn fresh_temp_files_survive_a_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let tmp = dir.path().join(format!("ledger.json{TMP_MARKER}1"));
        std::fs::write(&tmp, b"partial").unwrap();

        let (removed, failed) = remove_stale(dir.path(), SystemTime::now());
        assert_eq!((removed, failed), (0, 0));
        assert!(tmp.exists());

        let later = SystemTime::now() + STALE_AFTER + Duration::from_secs(1);
        let (removed, _) = remove_stale(dir.path(), later);
        assert_eq!(removed, 1);
        assert!(!tmp.exists());
    }
}
