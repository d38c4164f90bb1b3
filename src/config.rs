//! Typed model of the declarative site configuration (`pelicanconf.yaml`).
//! Deserialization is strict about the blocks the translator depends on:
//! the `site` block is required, and a `sitemap` block must carry all of
//! its nested fields. Everything else is optional with explicit defaults.

use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root of the declarative site configuration.
#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    pub site: SiteMeta,
    pub theme: Option<String>,
    #[serde(default)]
    pub debug: bool,
    pub content: Option<Content>,
    pub plugins: Option<Plugins>,
    pub genid: Option<GenId>,
    pub setup: Option<Setup>,
}

/// Basic information about the site, copied verbatim into the artifact.
#[derive(Debug, Deserialize, Serialize)]
pub struct SiteMeta {
    pub name: String,
    pub description: String,
    pub domain: String,
    pub url: String,
    pub logo: Option<String>,
    pub repository: Option<String>,
    pub trademarks: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Content layout: where pages live and which directories are static.
#[derive(Debug, Deserialize, Default)]
pub struct Content {
    pub pages: Option<String>,
    pub static_dirs: Option<Vec<String>>,
}

/// Plugin search paths, the explicit plugin list, and per-plugin parameters.
#[derive(Debug, Deserialize, Default)]
pub struct Plugins {
    pub paths: Option<Vec<String>>,
    #[serde(rename = "use")]
    pub use_: Option<Vec<String>>,
    pub sitemap: Option<Sitemap>,
}

/// Sitemap plugin parameters. All fields are required once the block exists.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Sitemap {
    pub exclude: String,
    pub format: String,
    pub priorities: SitemapValues,
    pub changefreqs: SitemapValues,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SitemapValues {
    pub articles: serde_yaml::Value,
    pub indexes: serde_yaml::Value,
    pub pages: serde_yaml::Value,
}

/// Identifier-generation parameters. Booleans default to false when absent;
/// depth limits default to unset, meaning "no limit".
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GenId {
    #[serde(default, rename = "unsafe")]
    pub unsafe_ids: bool,
    #[serde(default)]
    pub metadata: bool,
    #[serde(default)]
    pub elements: bool,
    #[serde(default)]
    pub permalinks: bool,
    #[serde(default)]
    pub tables: bool,
    #[serde(default)]
    pub debug: bool,
    pub headings_depth: Option<u32>,
    pub toc_depth: Option<u32>,
}

/// Optional setup block: external data, pre/post-run commands, ignore
/// patterns and directory copies.
#[derive(Debug, Deserialize, Default)]
pub struct Setup {
    pub data: Option<serde_yaml::Value>,
    pub run: Option<Vec<String>>,
    pub postrun: Option<Vec<String>>,
    pub ignore: Option<Vec<String>>,
    pub copy: Option<Vec<String>>,
}

impl SiteConfig {
    /// Loads and parses the configuration from a YAML file.
    ///
    /// # Errors
    /// * `BuildError::ConfigError` if the file is unreadable, malformed,
    ///   or missing the required `site` block fields.
    pub fn load<P: AsRef<Path>>(path: P) -> BuildResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            BuildError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&raw)
    }

    /// Parses the configuration from a YAML string.
    pub fn parse(raw: &str) -> BuildResult<Self> {
        serde_yaml::from_str(raw)
            .map_err(|e| BuildError::ConfigError(format!("invalid pelicanconf.yaml: {}", e)))
    }
}
