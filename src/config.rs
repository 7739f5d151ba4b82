//! Configuration management for the diagram generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (diagrams.toml)
//! - Environment variables (CDS_DIAGRAM__*)
//!
//! ## Example config file (diagrams.toml):
//! ```toml
//! [source]
//! convention = "schema"
//! search_dir = "./db"
//!
//! [render]
//! look = "neo"
//! layout = "elk"
//! theme = "dark"
//! title = true
//!
//! [types.project]
//! Genre = "Genre"
//! Taxonomy = "CategoryTaxonomy"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Main configuration for a rendering run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagramConfig {
    /// Where schema files come from
    #[serde(default)]
    pub source: SourceConfig,

    /// Document header options
    #[serde(default)]
    pub render: RenderConfig,

    /// Extra type table entries
    #[serde(default)]
    pub types: TypeConfig,
}

/// Source file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// File naming convention used when listing candidate files
    #[serde(default)]
    pub convention: FileConvention,

    /// Directory searched for cross-file references.
    /// Defaults to the directory of the rendered input.
    #[serde(default)]
    pub search_dir: Option<PathBuf>,
}

/// Which file names count as schema sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileConvention {
    /// Any `*.cds` file
    #[default]
    Plain,
    /// Only `*schema.cds` files
    Schema,
}

impl FileConvention {
    /// File name suffix accepted by this convention
    pub fn suffix(&self) -> &'static str {
        match self {
            FileConvention::Plain => ".cds",
            FileConvention::Schema => "schema.cds",
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(self.suffix())
    }
}

/// Mermaid front-matter options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_look")]
    pub look: String,

    #[serde(default = "default_layout")]
    pub layout: String,

    #[serde(default = "default_theme")]
    pub theme: String,

    /// Emit a `title:` derived from the input file name
    #[serde(default = "default_true")]
    pub title: bool,
}

/// Additional project/domain type names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeConfig {
    /// Map of declared type name to rendered label
    #[serde(default)]
    pub project: HashMap<String, String>,
}

// Default value functions
fn default_look() -> String {
    "neo".to_string()
}

fn default_layout() -> String {
    "elk".to_string()
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            look: default_look(),
            layout: default_layout(),
            theme: default_theme(),
            title: true,
        }
    }
}

impl DiagramConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally layering an explicit file on top
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "diagrams.toml",
            ".diagrams.toml",
            "config/diagrams.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "cds-diagrams") {
            let xdg_config = config_dir.config_dir().join("diagrams.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("CDS_DIAGRAM")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Directory holding cross-file candidates for `input`
    pub fn search_dir_for(&self, input: &Path) -> PathBuf {
        match &self.source.search_dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}
