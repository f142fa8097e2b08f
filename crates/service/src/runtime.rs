//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binary crates can call
//! `service::runtime::ensure_env` without depending directly on `common`.

use std::path::PathBuf;

/// Warn about missing static root or catalog directories.
pub async fn ensure_env(static_root: PathBuf, catalog_dirs: &[PathBuf]) -> anyhow::Result<()> {
    common::env::ensure_env(static_root, catalog_dirs).await
}
