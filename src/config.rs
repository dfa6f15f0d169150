//! Process configuration: explicit flag, then environment variable, then a
//! TOML config file, then a hard default.

use crate::bulk::EngineKind;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAGE_PORT: u16 = 2345;
pub const DEFAULT_HTTP_PORT: u16 = 1128;
pub const DEFAULT_CONTAINER_NAME: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub dage_port: Option<u16>,
    pub http_port: Option<u16>,
    pub engine: Option<String>,
    pub container_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub dage_port: u16,
    pub http_port: u16,
    pub engine: EngineKind,
    pub container_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dage_port: DEFAULT_DAGE_PORT,
            http_port: DEFAULT_HTTP_PORT,
            engine: EngineKind::Ordered,
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
        }
    }
}

/// CLI-supplied overrides; `None` fields fall through to env/file/default.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dage_port: Option<u16>,
    pub http_port: Option<u16>,
    pub engine: Option<EngineKind>,
    pub container_name: Option<String>,
    pub config_path: Option<std::path::PathBuf>,
}

/// Loads configuration with precedence CLI > env > config file > default.
#[must_use]
pub fn load(overrides: &CliOverrides) -> AppConfig {
    let file = read_config_file(overrides.config_path.as_deref());
    let mut cfg = AppConfig::default();

    if let Some(p) = file.dage_port {
        cfg.dage_port = p;
    }
    if let Some(p) = file.http_port {
        cfg.http_port = p;
    }
    if let Some(e) = file.engine.as_deref().and_then(|s| s.parse().ok()) {
        cfg.engine = e;
    }
    if let Some(n) = file.container_name {
        cfg.container_name = n;
    }

    if let Ok(p) = std::env::var("BULKCACHE_DAGE_PORT")
        && let Ok(p) = p.parse()
    {
        cfg.dage_port = p;
    }
    if let Ok(p) = std::env::var("BULKCACHE_HTTP_PORT")
        && let Ok(p) = p.parse()
    {
        cfg.http_port = p;
    }
    if let Ok(e) = std::env::var("BULKCACHE_ENGINE")
        && let Ok(e) = e.parse()
    {
        cfg.engine = e;
    }
    if let Ok(n) = std::env::var("BULKCACHE_CONTAINER_NAME") {
        cfg.container_name = n;
    }

    if let Some(p) = overrides.dage_port {
        cfg.dage_port = p;
    }
    if let Some(p) = overrides.http_port {
        cfg.http_port = p;
    }
    if let Some(e) = overrides.engine {
        cfg.engine = e;
    }
    if let Some(n) = &overrides.container_name {
        cfg.container_name = n.clone();
    }

    cfg
}

fn read_config_file(explicit: Option<&std::path::Path>) -> FileConfig {
    let mut candidates = Vec::new();
    if let Some(p) = explicit {
        candidates.push(p.to_path_buf());
    }
    if let Ok(p) = std::env::var("BULKCACHE_CONFIG") {
        candidates.push(std::path::PathBuf::from(p));
    }
    if let Ok(cur) = std::env::current_dir() {
        candidates.push(cur.join("bulkcache.toml"));
    }
    for path in candidates {
        if path.exists()
            && let Ok(text) = std::fs::read_to_string(&path)
            && let Ok(parsed) = toml::from_str::<FileConfig>(&text)
        {
            return parsed;
        }
    }
    FileConfig::default()
}
