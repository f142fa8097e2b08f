use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier prefix reserved for catalog diagrams. Backend ids are UUIDs and
/// can never start with it.
pub const STATIC_ID_PREFIX: &str = "file-";

/// Where a diagram lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramSource {
    Db,
    File,
}

impl DiagramSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramSource::Db => "db",
            DiagramSource::File => "file",
        }
    }
}

impl fmt::Display for DiagramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagramSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "db" => Ok(DiagramSource::Db),
            "file" => Ok(DiagramSource::File),
            other => Err(format!("unknown diagram source '{other}'")),
        }
    }
}

/// A diagram record. `flow` is the node/connection graph and is kept as
/// opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub flow: Option<Value>,
    pub version: i64,
    pub source: DiagramSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Diagram {
    pub fn into_summary(self) -> DiagramSummary {
        DiagramSummary {
            id: self.id,
            title: self.title,
            description: self.description,
            tags: self.tags,
            version: self.version,
            source: self.source,
        }
    }
}

/// List view of a diagram, without the flow payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub version: i64,
    pub source: DiagramSource,
}

/// Create input; id, version, source and timestamps are assigned server side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagramCreateRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub flow: Option<Value>,
}

/// Update input; `None` (or JSON `null`) keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagramUpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub flow: Option<Value>,
}

/// Listing filter shared by both storage backends and the catalog.
/// Empty strings behave like absent filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramFilter {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

impl DiagramFilter {
    pub fn new(tag: Option<&str>, query: Option<&str>) -> Self {
        Self { tag: tag.map(str::to_string), query: query.map(str::to_string) }
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().filter(|t| !t.is_empty())
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }

    /// Exact tag membership AND case-insensitive title substring.
    pub fn matches(&self, diagram: &Diagram) -> bool {
        let tag_ok = self.tag().map_or(true, |t| diagram.tags.iter().any(|dt| dt == t));
        let query_ok = self
            .query()
            .map_or(true, |q| diagram.title.to_lowercase().contains(&q.to_lowercase()));
        tag_ok && query_ok
    }
}
