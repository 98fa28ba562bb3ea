use carnet_core::{
    DanglingPolicy, DefaultTypeConfig, Dimensions, EntryVariant, JournalConfig, TypeConfig,
    TypeConfigProvider,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Contents of `carnet.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CarnetConfig {
    pub server: ServerConfig,
    pub graph: GraphConfig,
    pub links: LinksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub http_addr: String,
    pub data_dir: PathBuf,
    /// Origins allowed by CORS. Empty allows any.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "127.0.0.1:9091".to_string(),
            data_dir: PathBuf::from("./data"),
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Drawing area used when a request does not measure its own.
    pub width: f64,
    pub height: f64,
    /// Node colour per variant, e.g. `priere = "#4f46e5"`.
    pub colors: BTreeMap<String, String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        let Dimensions { width, height } = Dimensions::default();
        Self {
            width,
            height,
            colors: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub dangling_policy: DanglingPolicy,
}

impl CarnetConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&raw)?)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply the `--data-dir` override, if any.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.server.data_dir = dir;
        }
        self
    }

    /// Every problem found, as human-readable messages. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "[server] http_addr '{}' is not a socket address",
                self.server.http_addr
            ));
        }
        if self.server.data_dir.as_os_str().is_empty() {
            errors.push("[server] data_dir must not be empty".to_string());
        }

        for (name, value) in [("width", self.graph.width), ("height", self.graph.height)] {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("[graph] {} must be a positive number", name));
            }
        }
        for (variant, color) in &self.graph.colors {
            if variant.parse::<EntryVariant>().is_err() {
                errors.push(format!("[graph.colors] unknown entry type '{}'", variant));
            }
            if !is_hex_color(color) {
                errors.push(format!(
                    "[graph.colors] '{}' for {} is not a #rgb or #rrggbb colour",
                    color, variant
                ));
            }
        }

        errors
    }

    pub fn db_path(&self) -> PathBuf {
        self.server.data_dir.join("carnet.redb")
    }

    pub fn journal_config(&self) -> JournalConfig {
        JournalConfig {
            dangling_policy: self.links.dangling_policy,
        }
    }

    pub fn default_dimensions(&self) -> Dimensions {
        Dimensions::measured(self.graph.width, self.graph.height)
    }

    pub fn palette(&self) -> ConfiguredPalette {
        let overrides = self
            .graph
            .colors
            .iter()
            .filter_map(|(k, v)| Some((k.parse::<EntryVariant>().ok()?, v.clone())))
            .collect();
        ConfiguredPalette { overrides }
    }
}

fn is_hex_color(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Stock palette with per-variant colours taken from `[graph.colors]`.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPalette {
    overrides: BTreeMap<EntryVariant, String>,
}

impl TypeConfigProvider for ConfiguredPalette {
    fn type_config(&self, variant: EntryVariant) -> TypeConfig {
        let mut config = DefaultTypeConfig.type_config(variant);
        if let Some(color) = self.overrides.get(&variant) {
            config.color = color.clone();
            config.gradient.1 = color.clone();
        }
        config
    }
}
