//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.aopnet.toml` files.

use crate::cli::{Args, OutputFormat};
use anyhow::{Context, Result};
use aopnet::builder::EnrichOptions;
use aopnet::query::{aopwiki, bgee};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".aopnet.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SPARQL endpoint settings.
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Enrichment settings.
    #[serde(default)]
    pub query: QueryConfig,

    /// Export settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// SPARQL endpoints and their timeouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_aopwiki_url")]
    pub aopwiki_url: String,

    /// AOP-Wiki request timeout in seconds.
    #[serde(default = "default_aopwiki_timeout")]
    pub aopwiki_timeout: u64,

    #[serde(default = "default_bgee_url")]
    pub bgee_url: String,

    /// Bgee request timeout in seconds.
    #[serde(default = "default_bgee_timeout")]
    pub bgee_timeout: u64,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            aopwiki_url: default_aopwiki_url(),
            aopwiki_timeout: default_aopwiki_timeout(),
            bgee_url: default_bgee_url(),
            bgee_timeout: default_bgee_timeout(),
        }
    }
}

fn default_aopwiki_url() -> String {
    aopwiki::DEFAULT_ENDPOINT.to_string()
}

fn default_aopwiki_timeout() -> u64 {
    aopwiki::DEFAULT_TIMEOUT_SECS
}

fn default_bgee_url() -> String {
    bgee::DEFAULT_ENDPOINT.to_string()
}

fn default_bgee_timeout() -> u64 {
    bgee::DEFAULT_TIMEOUT_SECS
}

/// Which enrichments run after the network is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub genes: bool,

    /// Add protein nodes next to genes.
    #[serde(default = "default_true")]
    pub include_proteins: bool,

    #[serde(default)]
    pub organs: bool,

    #[serde(default)]
    pub components: bool,

    /// Keep only Gene Ontology processes.
    #[serde(default)]
    pub go_only: bool,

    #[serde(default)]
    pub compounds: bool,

    /// Query Bgee for expression of the network's genes in its organs.
    #[serde(default)]
    pub gene_expression: bool,

    /// Minimum Bgee confidence percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            genes: false,
            include_proteins: true,
            organs: false,
            components: false,
            go_only: false,
            compounds: false,
            gene_expression: false,
            confidence: None,
        }
    }
}

impl QueryConfig {
    pub fn enrich_options(&self) -> EnrichOptions {
        EnrichOptions {
            genes: self.genes,
            include_proteins: self.include_proteins,
            organs: self.organs,
            components: self.components,
            go_only: self.go_only,
            compounds: self.compounds,
            gene_expression: self.gene_expression,
            confidence: self.confidence,
        }
    }
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Embed the Cytoscape style sheet.
    #[serde(default = "default_true")]
    pub include_styles: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Output file; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            include_styles: true,
            name: None,
            description: None,
            path: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.aopnet.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the CLI provides explicitly are applied.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref url) = args.aopwiki_url {
            self.endpoints.aopwiki_url = url.clone();
        }
        if let Some(ref url) = args.bgee_url {
            self.endpoints.bgee_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.endpoints.aopwiki_timeout = timeout;
            self.endpoints.bgee_timeout = timeout;
        }

        // Enrichment flags only switch things on
        self.query.genes |= args.genes;
        self.query.organs |= args.organs;
        self.query.components |= args.components;
        self.query.go_only |= args.go_only;
        self.query.compounds |= args.compounds;
        self.query.gene_expression |= args.expression;
        if args.no_proteins {
            self.query.include_proteins = false;
        }
        if args.confidence.is_some() {
            self.query.confidence = args.confidence;
        }

        if let Some(format) = args.format {
            self.output.format = format;
        }
        if args.no_styles {
            self.output.include_styles = false;
        }
        if args.name.is_some() {
            self.output.name = args.name.clone();
        }
        if args.description.is_some() {
            self.output.description = args.description.clone();
        }
        if args.output.is_some() {
            self.output.path = args.output.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aopnet::query::QueryType;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoints.aopwiki_url, aopwiki::DEFAULT_ENDPOINT);
        assert_eq!(config.endpoints.aopwiki_timeout, 10);
        assert_eq!(config.endpoints.bgee_timeout, 30);
        assert!(config.query.include_proteins);
        assert!(!config.query.genes);
        assert_eq!(config.output.format, OutputFormat::Cytoscape);
        assert!(config.output.include_styles);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[endpoints]
aopwiki_url = "http://localhost:8890/sparql"
bgee_timeout = 60

[query]
genes = true
include_proteins = false
confidence = 50

[output]
format = "markdown"
name = "Liver network"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.endpoints.aopwiki_url, "http://localhost:8890/sparql");
        assert_eq!(config.endpoints.aopwiki_timeout, 10);
        assert_eq!(config.endpoints.bgee_timeout, 60);
        assert!(config.query.genes);
        assert!(!config.query.include_proteins);
        assert_eq!(config.query.confidence, Some(50));
        assert_eq!(config.output.format, OutputFormat::Markdown);
        assert_eq!(config.output.name.as_deref(), Some("Liver network"));
        assert!(config.output.path.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[query]\norgans = true").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.query.organs);
        assert_eq!(config.endpoints, EndpointsConfig::default());
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[query]\norgans = \"sometimes\"").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE), Config::default_toml()).unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config: Config = toml::from_str(
            r#"
[query]
compounds = true

[output]
format = "tables"
"#,
        )
        .unwrap();
        let args = Args::try_parse_from([
            "aopnet",
            "--values",
            "https://identifiers.org/aop.events/1",
            "--genes",
            "--no-proteins",
            "--timeout",
            "5",
            "--no-styles",
        ])
        .unwrap();
        assert_eq!(args.query_type, QueryType::Mie);

        config.merge_with_args(&args);
        assert!(config.query.genes);
        assert!(config.query.compounds);
        assert!(!config.query.include_proteins);
        assert_eq!(config.endpoints.aopwiki_timeout, 5);
        assert_eq!(config.endpoints.bgee_timeout, 5);
        assert_eq!(config.output.format, OutputFormat::Tables);
        assert!(!config.output.include_styles);

        let options = config.query.enrich_options();
        assert!(options.genes && options.compounds);
        assert!(!options.include_proteins);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[endpoints]"));
        assert!(toml_str.contains("[query]"));
        assert!(toml_str.contains("[output]"));
        assert!(toml_str.contains("format = \"cytoscape\""));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
