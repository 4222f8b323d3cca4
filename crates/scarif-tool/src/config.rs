use serde::Deserialize;
use std::path::Path;

use scarif::{CodecOptions, TileFormat};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG: &str = "scarif.toml";

#[derive(Debug, Default, Deserialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub codec: CodecOptions,
    #[serde(default)]
    pub tiles: TilesSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct TilesSection {
    /// NBT flavor used when printing tile data.
    #[serde(default)]
    pub format: TileFormat,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ToolConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load `path` if given, else `scarif.toml` if present, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG).exists() => Self::load(DEFAULT_CONFIG),
            None => Ok(Self::default()),
        }
    }
}
