//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use aopnet::query::QueryType;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// aopnet - build Adverse Outcome Pathway networks from AOP-Wiki
///
/// Queries the AOP-Wiki SPARQL endpoint for the pathways around a set of
/// MIEs, AOPs or key events, optionally enriches them with genes, organs,
/// components, compounds and Bgee expression data, and exports the result.
///
/// Examples:
///   aopnet --values https://identifiers.org/aop.events/1502 --genes
///   aopnet --query-type aop --values "https://identifiers.org/aop/3" --format cx2 -o net.cx2
///   aopnet --input network.json --expression --confidence 50 --format tables
///   aopnet --values https://identifiers.org/aop.events/1502 --dry-run
///   aopnet --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Which key event the identifier values anchor
    ///
    /// Values: mie, aop, ke_upstream, ke_downstream
    #[arg(short = 't', long, default_value = "mie", value_name = "TYPE")]
    pub query_type: QueryType,

    /// Whitespace-separated identifier URIs
    #[arg(long, value_name = "URIS", conflicts_with = "input")]
    pub values: Option<String>,

    /// Load an existing Cytoscape JSON network instead of querying by identifier
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Add gene associations
    #[arg(long)]
    pub genes: bool,

    /// Skip protein nodes when adding genes
    #[arg(long)]
    pub no_proteins: bool,

    /// Add organ associations
    #[arg(long)]
    pub organs: bool,

    /// Add key event components (process, object, action)
    #[arg(long)]
    pub components: bool,

    /// Only keep Gene Ontology processes when adding components
    #[arg(long)]
    pub go_only: bool,

    /// Add compounds linked to the network's AOPs
    #[arg(long)]
    pub compounds: bool,

    /// Add Bgee gene expression in the network's organs
    ///
    /// Needs genes and organs in the network.
    #[arg(long)]
    pub expression: bool,

    /// Minimum Bgee confidence percentage (0 - 100)
    #[arg(long, value_name = "PERCENT")]
    pub confidence: Option<u8>,

    /// Output file path; stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (cytoscape, cx2, tables, markdown)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Leave the Cytoscape style sheet out of the export
    #[arg(long)]
    pub no_styles: bool,

    /// Network name for CX2 and Markdown exports
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Network description for CX2 and Markdown exports
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// AOP-Wiki SPARQL endpoint URL
    #[arg(long, env = "AOPNET_AOPWIKI_URL", value_name = "URL")]
    pub aopwiki_url: Option<String>,

    /// Bgee SPARQL endpoint URL
    #[arg(long, env = "AOPNET_BGEE_URL", value_name = "URL")]
    pub bgee_url: Option<String>,

    /// Request timeout in seconds, applied to both endpoints
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .aopnet.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the identifier query and exit without contacting any endpoint
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with code 2 when the resulting network has no key events
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Generate a default .aopnet.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Export format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Cytoscape.js JSON (default)
    #[default]
    Cytoscape,
    /// NDEx CX2 JSON
    Cx2,
    /// Row tables as JSON
    Tables,
    /// Markdown report
    Markdown,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        match (&self.values, &self.input) {
            (None, None) => {
                return Err("Either --values or --input is required".to_string());
            }
            (Some(values), _) if values.trim().is_empty() => {
                return Err("--values must contain at least one URI".to_string());
            }
            _ => {}
        }

        if self.dry_run && self.values.is_none() {
            return Err("--dry-run needs --values".to_string());
        }

        if let Some(ref input) = self.input {
            if !input.is_file() {
                return Err(format!("Input file does not exist: {}", input.display()));
            }
        }

        for (flag, url) in [
            ("AOP-Wiki", &self.aopwiki_url),
            ("Bgee", &self.bgee_url),
        ] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(format!("{} URL must start with 'http://' or 'https://'", flag));
                }
            }
        }

        if let Some(confidence) = self.confidence {
            if confidence > 100 {
                return Err("Confidence must be between 0 and 100".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            query_type: QueryType::Mie,
            values: Some("https://identifiers.org/aop.events/1502".to_string()),
            input: None,
            genes: false,
            no_proteins: false,
            organs: false,
            components: false,
            go_only: false,
            compounds: false,
            expression: false,
            confidence: None,
            output: None,
            format: None,
            no_styles: false,
            name: None,
            description: None,
            aopwiki_url: None,
            bgee_url: None,
            timeout: None,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            fail_on_empty: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "aopnet",
            "--query-type",
            "ke_upstream",
            "--values",
            "https://identifiers.org/aop.events/1",
            "--genes",
            "--format",
            "cx2",
            "--confidence",
            "50",
        ])
        .unwrap();
        assert_eq!(args.query_type, QueryType::KeUpstream);
        assert!(args.genes);
        assert_eq!(args.format, Some(OutputFormat::Cx2));
        assert_eq!(args.confidence, Some(50));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_values_and_input_conflict() {
        let result = Args::try_parse_from([
            "aopnet",
            "--values",
            "https://identifiers.org/aop/3",
            "--input",
            "net.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_requires_source() {
        let mut args = make_args();
        args.values = None;
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_blank_values() {
        let mut args = make_args();
        args.values = Some("   ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_input_file() {
        let mut args = make_args();
        args.values = None;
        args.input = Some(PathBuf::from("/nonexistent/network.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_bad_endpoint_and_ranges() {
        let mut args = make_args();
        args.bgee_url = Some("ftp://bgee.org".to_string());
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.confidence = Some(120);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
