use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }

/// Which storage backend holds the `db` diagrams.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    #[serde(alias = "inMemory", alias = "memory")]
    InMemory,
    #[serde(alias = "dynamo", alias = "db")]
    Table,
}

impl std::str::FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(StoreKind::InMemory),
            "table" | "dynamo" | "db" => Ok(StoreKind::Table),
            other => Err(anyhow!("unknown diagram store '{other}' (expected in_memory or table)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_run_migrations() -> bool { true }

/// Locations of the static site and of the bundled diagram catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_static_root")]
    pub static_root: String,
    #[serde(default = "default_json_dirs")]
    pub json_dirs: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { static_root: default_static_root(), json_dirs: default_json_dirs() }
    }
}

fn default_static_root() -> String { "static".into() }
fn default_json_dirs() -> Vec<String> { vec!["static/json".into()] }

/// Load `$CONFIG_PATH` (default `config.toml`); a missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if std::path::Path::new(&path).exists() {
        load_from_file(&path)
    } else {
        Ok(AppConfig::default())
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay environment variables on top of the file values. The lookup is
    /// injected so tests do not have to touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port.trim().parse().map_err(|e| anyhow!("SERVER_PORT: {e}"))?;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.trim().parse().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(kind) = lookup("DIAGRAM_STORE") {
            self.store.kind = kind.parse()?;
        }
        if let Some(root) = lookup("STATIC_ROOT") {
            self.catalog.static_root = root;
        }
        if let Some(dirs) = lookup("CATALOG_DIRS") {
            self.catalog.json_dirs = dirs
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect();
        }
        self.database.normalize_from(&lookup);
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        if self.store.kind == StoreKind::Table {
            self.database.validate()?;
        }
        if self.catalog.json_dirs.is_empty() {
            return Err(anyhow!("catalog.json_dirs must list at least one directory"));
        }
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    fn normalize_from<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // the file wins; DATABASE_URL only fills an empty url
        if self.url.trim().is_empty() {
            if let Some(url) = lookup("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn default_store_is_in_memory() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.store.kind, StoreKind::InMemory);
        assert_eq!(cfg.catalog.json_dirs, vec!["static/json".to_string()]);
        Ok(())
    }

    #[test]
    fn empty_file_yields_defaults() -> Result<()> {
        let cfg = load_from_str("")?;
        assert_eq!(cfg.store.kind, StoreKind::InMemory);
        assert_eq!(cfg.server.port, 8080);
        Ok(())
    }

    #[test]
    fn table_store_parses_from_toml() -> Result<()> {
        let mut cfg = load_from_str(
            r#"
            [store]
            kind = "table"

            [database]
            url = "postgres://u:p@localhost:5432/archviz"
            "#,
        )?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.store.kind, StoreKind::Table);
        assert_eq!(cfg.database.max_connections, 10);
        assert!(cfg.database.run_migrations);
        Ok(())
    }

    #[test]
    fn partial_server_section_keeps_defaults() -> Result<()> {
        let cfg = load_from_str("[server]\nport = 9000\n")?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 9000);
        Ok(())
    }

    #[test]
    fn legacy_in_memory_alias_is_accepted() -> Result<()> {
        let cfg = load_from_str("[store]\nkind = \"inMemory\"\n")?;
        assert_eq!(cfg.store.kind, StoreKind::InMemory);
        Ok(())
    }

    #[test]
    fn table_store_requires_database_url() {
        let mut cfg = AppConfig::default();
        cfg.store.kind = StoreKind::Table;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn env_overrides_store_and_catalog() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env_of(&[
            ("DIAGRAM_STORE", "table"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("CATALOG_DIRS", "a/json, b/json,"),
            ("SERVER_PORT", "9090"),
        ]))?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.store.kind, StoreKind::Table);
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.catalog.json_dirs, vec!["a/json".to_string(), "b/json".to_string()]);
        assert_eq!(cfg.server.port, 9090);
        Ok(())
    }

    #[test]
    fn unknown_store_kind_is_rejected() {
        let mut cfg = AppConfig::default();
        assert!(cfg.apply_env(env_of(&[("DIAGRAM_STORE", "redis")])).is_err());
    }

    #[test]
    fn file_url_wins_over_env() -> Result<()> {
        let mut cfg = load_from_str("[database]\nurl = \"postgres://file\"\n")?;
        cfg.apply_env(env_of(&[("DATABASE_URL", "postgres://env")]))?;
        assert_eq!(cfg.database.url, "postgres://file");
        Ok(())
    }

    #[test]
    fn zero_workers_normalized() -> Result<()> {
        let mut cfg = AppConfig::default();
        cfg.server.worker_threads = Some(0);
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.server.worker_threads, Some(4));
        Ok(())
    }
}
