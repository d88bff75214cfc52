use prosetyped_engine::{IgnoreAttribute, Options};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown file to reveal when none is given on the command line.
    pub source_path: Option<PathBuf>,
    /// Milliseconds between streamed chunks.
    pub chunk_interval: u64,
    /// Defaults to [`Config::streaming_options`]. A `[typing]` table replaces
    /// those defaults field by field, so an explicit `ignore_attributes`
    /// must repeat the list entries to keep them.
    pub typing: Options,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: None,
            chunk_interval: 750,
            typing: Self::streaming_options(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the source path
        config.source_path = config
            .source_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/prosetyped");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Typing options for a document streamed as growing prefixes. A list
    /// turns loose once a later item is separated by a blank line, which
    /// flips its `tight` attribute; ignoring it keeps the revealed list.
    pub fn streaming_options() -> Options {
        Options {
            ignore_attributes: ["bullet_list", "ordered_list"]
                .into_iter()
                .map(|node_type| IgnoreAttribute::Scoped {
                    node_type: node_type.to_string(),
                    attributes: vec!["tight".to_string()],
                })
                .collect(),
            ..Options::default()
        }
    }

    pub fn chunk_period(&self) -> Duration {
        Duration::from_millis(self.chunk_interval.max(1))
    }

    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
