use crate::history::DEFAULT_HISTORY_LIMIT;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,
    /// Maximum analyses kept for the session summary
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_true")]
    pub show_explanations: bool,
    /// How many weighted features to list under "Top Impacting Features" (0 hides the section)
    #[serde(default = "default_top_features")]
    pub top_features: usize,
    #[serde(default = "default_true")]
    pub show_history: bool,
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Text
}

fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_top_features() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: default_output_format(),
            history_limit: default_history_limit(),
            show_explanations: true,
            top_features: default_top_features(),
            show_history: true,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))?;
        Ok(())
    }

    /// Load `path`, falling back to defaults when the file does not exist.
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if Path::new(path).exists() {
            Self::from_file(path)
        } else {
            log::warn!("Config file not found: {}, using defaults", path);
            Ok(Self::default())
        }
    }
}
