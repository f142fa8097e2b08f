use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use super::domain::{Diagram, DiagramSource, STATIC_ID_PREFIX};
use crate::errors::ServiceError;

/// Read-only catalog of diagrams shipped as `*.json` files.
///
/// Directories are searched in order; when the same filename exists in more
/// than one of them the first one wins. Nothing is cached, every call
/// re-reads the directories.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    dirs: Vec<PathBuf>,
}

impl StaticCatalog {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self { dirs: dirs.into_iter().map(Into::into).collect() }
    }

    /// Every parsable catalog file as a `file` diagram. Unreadable or
    /// malformed files are logged and skipped.
    pub async fn load_static_diagrams(&self) -> Vec<Diagram> {
        let mut out = Vec::new();
        for (stem, path) in self.json_files().await {
            match load_file(&stem, &path).await {
                Ok(d) => out.push(d),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping static diagram"),
            }
        }
        debug!(count = out.len(), "static catalog loaded");
        out
    }

    /// Direct lookup of `<stem>.json` for an id of the form `file-<stem>`.
    pub async fn load_static_diagram_by_id(&self, id: &str) -> Option<Diagram> {
        let stem = id.strip_prefix(STATIC_ID_PREFIX)?;
        if !is_plain_stem(stem) {
            return None;
        }
        let filename = format!("{stem}.json");
        for dir in &self.dirs {
            let path = dir.join(&filename);
            if !is_file(&path).await {
                continue;
            }
            return match load_file(stem, &path).await {
                Ok(d) => Some(d),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "static diagram could not be loaded");
                    None
                }
            };
        }
        None
    }

    /// Filenames of all catalog files, deduplicated, in discovery order.
    pub async fn list_json_files(&self) -> Vec<String> {
        self.json_files()
            .await
            .into_iter()
            .filter_map(|(_, path)| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect()
    }

    async fn json_files(&self) -> Vec<(String, PathBuf)> {
        let mut seen: Vec<String> = Vec::new();
        let mut files = Vec::new();
        for dir in &self.dirs {
            let mut entries = match fs::read_dir(dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "catalog directory unavailable");
                    continue;
                }
            };
            let mut found = Vec::new();
            loop {
                match entries.next_entry().await {
                    Ok(Some(entry)) => {
                        let path = entry.path();
                        if path.extension().and_then(|e| e.to_str()) != Some("json") {
                            continue;
                        }
                        let Some(stem) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                            continue;
                        };
                        if is_file(&path).await {
                            found.push((stem, path));
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "catalog directory listing interrupted");
                        break;
                    }
                }
            }
            found.sort_by(|a, b| a.1.file_name().cmp(&b.1.file_name()));
            for (stem, path) in found {
                let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                if seen.contains(&name) {
                    continue;
                }
                seen.push(name);
                files.push((stem, path));
            }
        }
        files
    }
}

// The stem is always joined as `<stem>.json`, so only separators can escape a directory.
fn is_plain_stem(stem: &str) -> bool {
    !stem.is_empty() && !stem.contains(['/', '\\'])
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

async fn load_file(stem: &str, path: &Path) -> Result<Diagram, ServiceError> {
    let parse_err = |reason: String| ServiceError::CatalogParse { path: path.display().to_string(), reason };
    let bytes = fs::read(path).await.map_err(|e| parse_err(e.to_string()))?;
    let doc: Value = serde_json::from_slice(&bytes).map_err(|e| parse_err(e.to_string()))?;
    let modified = fs::metadata(path)
        .await
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());
    Ok(diagram_from_document(stem, doc, modified))
}

/// Build the catalog view of a parsed file. Title, description and tags are
/// read from the document's top level when present; the whole document
/// becomes the flow.
pub fn diagram_from_document(stem: &str, doc: Value, modified: DateTime<Utc>) -> Diagram {
    let title = doc
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map_or_else(|| stem.to_string(), str::to_string);
    let description = doc.get("description").and_then(Value::as_str).map(str::to_string);
    let tags = doc
        .get("tags")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    Diagram {
        id: format!("{STATIC_ID_PREFIX}{stem}"),
        title,
        description,
        tags,
        flow: Some(doc),
        version: 1,
        source: DiagramSource::File,
        created_at: modified,
        updated_at: modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    struct TempDir(PathBuf);

    impl TempDir {
        async fn new() -> anyhow::Result<Self> {
            let p = std::env::temp_dir().join(format!("archviz_catalog_{}", Uuid::new_v4()));
            fs::create_dir_all(&p).await?;
            Ok(Self(p))
        }

        async fn write(&self, name: &str, body: &str) -> anyhow::Result<()> {
            fs::write(self.0.join(name), body).await?;
            Ok(())
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[tokio::test]
    async fn malformed_file_is_skipped_and_load_continues() -> anyhow::Result<()> {
        let dir = TempDir::new().await?;
        dir.write("broken.json", "{ not json").await?;
        dir.write("good.json", r#"{"title":"Good","nodes":[]}"#).await?;

        let catalog = StaticCatalog::new([dir.0.clone()]);
        let all = catalog.load_static_diagrams().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "file-good");
        assert_eq!(all[0].title, "Good");
        Ok(())
    }

    #[tokio::test]
    async fn documents_become_file_diagrams() -> anyhow::Result<()> {
        let dir = TempDir::new().await?;
        dir.write(
            "order-flow.json",
            r#"{"title":"Order Flow","description":"checkout","tags":["ecommerce",7,"kafka"],"nodes":[{"id":"n1"}]}"#,
        )
        .await?;
        dir.write("untitled.json", r#"{"nodes":[]}"#).await?;
        dir.write("notes.txt", "ignored").await?;

        let all = StaticCatalog::new([dir.0.clone()]).load_static_diagrams().await;
        assert_eq!(all.len(), 2);
        for d in &all {
            assert_eq!(d.source, DiagramSource::File);
            assert!(d.id.starts_with(STATIC_ID_PREFIX));
            assert!(d.flow.is_some());
            assert_eq!(d.version, 1);
        }
        let order = &all[0];
        assert_eq!(order.id, "file-order-flow");
        assert_eq!(order.description.as_deref(), Some("checkout"));
        assert_eq!(order.tags, vec!["ecommerce".to_string(), "kafka".to_string()]);
        assert_eq!(order.flow.as_ref().map(|f| f["nodes"][0]["id"].clone()), Some(json!("n1")));
        assert_eq!(all[1].title, "untitled");
        Ok(())
    }

    #[tokio::test]
    async fn lookup_by_id_reads_single_file() -> anyhow::Result<()> {
        let dir = TempDir::new().await?;
        dir.write("alpha.json", r#"{"title":"Alpha"}"#).await?;
        let catalog = StaticCatalog::new([dir.0.clone()]);

        let found = catalog.load_static_diagram_by_id("file-alpha").await;
        assert_eq!(found.map(|d| d.title), Some("Alpha".to_string()));
        assert!(catalog.load_static_diagram_by_id("file-nonexistent").await.is_none());
        assert!(catalog.load_static_diagram_by_id("alpha").await.is_none());
        assert!(catalog.load_static_diagram_by_id("file-../alpha").await.is_none());
        assert!(catalog.load_static_diagram_by_id("file-..\\alpha").await.is_none());
        assert!(catalog.load_static_diagram_by_id("file-").await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn every_listed_id_can_be_fetched() -> anyhow::Result<()> {
        let dir = TempDir::new().await?;
        dir.write("a..b.json", r#"{"title":"Dotted"}"#).await?;
        dir.write("v1..v2.json", r#"{"nodes":[]}"#).await?;
        let catalog = StaticCatalog::new([dir.0.clone()]);

        let listed = catalog.load_static_diagrams().await;
        assert_eq!(listed.len(), 2);
        for d in listed {
            let by_id = catalog.load_static_diagram_by_id(&d.id).await;
            assert_eq!(by_id.map(|f| f.id), Some(d.id));
        }
        Ok(())
    }

    #[tokio::test]
    async fn earlier_directory_wins_and_listing_is_deduplicated() -> anyhow::Result<()> {
        let first = TempDir::new().await?;
        let second = TempDir::new().await?;
        first.write("shared.json", r#"{"title":"From first"}"#).await?;
        second.write("shared.json", r#"{"title":"From second"}"#).await?;
        second.write("extra.json", r#"{"title":"Extra"}"#).await?;

        let catalog = StaticCatalog::new([first.0.clone(), second.0.clone()]);
        assert_eq!(catalog.list_json_files().await, vec!["shared.json".to_string(), "extra.json".to_string()]);

        let all = catalog.load_static_diagrams().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "From first");
        let by_id = catalog.load_static_diagram_by_id("file-shared").await;
        assert_eq!(by_id.map(|d| d.title), Some("From first".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn missing_directory_yields_empty_catalog() {
        let catalog = StaticCatalog::new([std::env::temp_dir().join(format!("archviz_none_{}", Uuid::new_v4()))]);
        assert!(catalog.load_static_diagrams().await.is_empty());
        assert!(catalog.list_json_files().await.is_empty());
    }

    #[test]
    fn blank_title_falls_back_to_stem() {
        let d = diagram_from_document("payments", json!({"title": "   "}), Utc::now());
        assert_eq!(d.title, "payments");
        let d = diagram_from_document("list", json!([1, 2, 3]), Utc::now());
        assert_eq!(d.title, "list");
        assert_eq!(d.flow, Some(json!([1, 2, 3])));
    }
}
