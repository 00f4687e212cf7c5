use crate::domains::navigation::{BakeConfig, GraphBuildConfig, QueryConfig, SamplerConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub graph: GraphBuildConfig,
    #[serde(default)]
    pub bake: BakeConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Key under which the baked asset is stored.
    pub name: String,
    /// GeoJSON file under `<data_dir>/scenes`; defaults to `<name>.geojson`.
    #[serde(default)]
    pub source: Option<String>,
}

impl SceneConfig {
    pub fn source_file(&self) -> String {
        self.source
            .clone()
            .unwrap_or_else(|| format!("{}.geojson", self.name))
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            source: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides NAV_DATA_DIR and the built-in search locations.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// Also write the nine-float text lookup file next to the binary asset.
    #[serde(default)]
    pub write_legacy_text: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Domain log file; console only when unset.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: default_level(),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Layers the TOML file (optional) under `NAV__SECTION__KEY` environment overrides,
    /// e.g. `NAV__BAKE__THREADS=4`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()).required(false))
            .add_source(
                ::config::Environment::with_prefix("NAV")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
