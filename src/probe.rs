//! Tracker readiness probe
//!
//! Checks whether the tracker client binary is currently invocable. The
//! check is deliberately uncached: it is a single `stat` guarding a process
//! spawn, and the tracker may be installed or removed while the plugin runs.

use std::path::Path;

/// Returns true when `path` is a regular file that the process can execute.
///
/// A missing or non-executable tracker means every dependent dispatch
/// silently no-ops; the tracker's absence must never crash or block the
/// hosting session.
pub fn tracker_ready(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}
