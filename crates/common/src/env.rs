//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::warn;

/// Warn about missing static directories; none of them is fatal because the
/// catalog tolerates an empty or partial directory set.
pub async fn ensure_env<P: AsRef<Path>>(static_root: P, catalog_dirs: &[P]) -> anyhow::Result<()> {
    let static_root = static_root.as_ref();
    if tokio::fs::metadata(static_root).await.is_err() {
        warn!(static_root = %static_root.display(), "static root not found; static assets may 404");
    }
    for dir in catalog_dirs {
        let dir = dir.as_ref();
        match tokio::fs::metadata(dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => warn!(dir = %dir.display(), "catalog path is not a directory; it will be skipped"),
            Err(_) => warn!(dir = %dir.display(), "catalog directory not found; it will be skipped"),
        }
    }
    Ok(())
}
