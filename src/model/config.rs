use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::format::OutputFormat;
use crate::parser::ParseOptions;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub parser: ParserConfig,
    pub output: OutputConfig,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    pub trim_values: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Print lost nodes to stderr after each parse.
    pub report_lost: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// File extension picked up when walking directories.
    pub extension: String,
    /// Descend into hidden files and directories.
    pub hidden: bool,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        match user_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::from_toml_str(""),
        }
    }

    /// Load an explicit config file over the defaults. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let user_str = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loading user config");
        Self::from_toml_str(&user_str)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    /// Merge `user_str` over the built-in defaults, key by key.
    pub fn from_toml_str(user_str: &str) -> Result<Self> {
        let mut merged: toml::Table = toml::from_str(DEFAULTS)?;
        let user: toml::Table = toml::from_str(user_str)?;
        merge_tables(&mut merged, user);

        let config: AppConfig = toml::Value::Table(merged).try_into()?;
        if config.scan.extension.is_empty() {
            return Err(anyhow!("scan.extension must not be empty"));
        }
        Ok(config)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            trim_values: self.parser.trim_values,
        }
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "duml").map(|d| d.config_dir().join("config.toml"))
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}
