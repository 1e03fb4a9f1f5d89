//! aopnet - Adverse Outcome Pathway network builder
//!
//! A CLI tool that queries AOP-Wiki and Bgee over SPARQL, assembles an AOP
//! network and exports it as Cytoscape JSON, CX2, tables or Markdown.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (endpoint, config, input file, etc.)
//!   2 - Empty network with --fail-on-empty

mod cli;
mod config;

use anyhow::{Context, Result};
use aopnet::builder::{AopNetworkBuilder, EnrichOptions, QueryOutcome};
use aopnet::export::{generate_markdown_report, to_cx2, Cx2Options, NetworkTables, ReportMetadata};
use aopnet::model::AopNetwork;
use aopnet::query::{aopwiki, bgee, HttpSparqlClient, SparqlEndpoint};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("aopnet v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .aopnet.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to choose endpoints, enrichments and the output format.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete build-and-export workflow. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if args.dry_run {
        return handle_dry_run(&args);
    }

    let aopwiki_client = HttpSparqlClient::new(
        aopwiki::SERVICE_NAME,
        &config.endpoints.aopwiki_url,
        config.endpoints.aopwiki_timeout,
    )
    .context("Failed to create AOP-Wiki client")?;
    let bgee_client = HttpSparqlClient::new(
        bgee::SERVICE_NAME,
        &config.endpoints.bgee_url,
        config.endpoints.bgee_timeout,
    )
    .context("Failed to create Bgee client")?;
    let mut builder = AopNetworkBuilder::new(aopwiki_client, bgee_client);

    let progress = (!args.quiet).then(spinner);
    let options = config.query.enrich_options();
    let built = build_network(&mut builder, &args, &options, progress.as_ref()).await;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    let source = built?;

    let network = builder.into_network();
    info!("{}", network);

    let output = render(&network, &config, &source)?;
    write_output(config.output.path.as_deref(), &output)?;

    if !args.quiet {
        let summary = network.summary();
        eprintln!("\n📊 Network Summary:");
        eprintln!(
            "   MIEs: {} | KEs: {} | AOs: {} | KERs: {} | AOPs: {}",
            summary.mie_count,
            summary.ke_count,
            summary.ao_count,
            summary.ker_count,
            summary.total_aops
        );
        eprintln!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
        if let Some(path) = &config.output.path {
            eprintln!("\n✅ Network saved to: {}", path.display());
        }
    }

    if args.fail_on_empty && network.key_events().is_empty() {
        eprintln!("\n⛔ The network has no key events. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: print the pathway query and exit.
fn handle_dry_run(args: &Args) -> Result<i32> {
    let values = args.values.as_deref().unwrap_or_default();
    println!("{}", aopwiki::aop_network_query(args.query_type, values));
    Ok(0)
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Load or query the network backbone, then run the configured enrichments.
/// Returns a description of where the network came from.
async fn build_network<E: SparqlEndpoint>(
    builder: &mut AopNetworkBuilder<E>,
    args: &Args,
    options: &EnrichOptions,
    progress: Option<&ProgressBar>,
) -> Result<String> {
    let set_message = |message: &'static str| {
        if let Some(pb) = progress {
            pb.set_message(message);
        }
    };

    let source = if let Some(input) = &args.input {
        set_message("Loading network...");
        builder
            .update_from_file(input)
            .with_context(|| format!("Failed to load network from {}", input.display()))?;
        format!("input: {}", input.display())
    } else {
        let values = args.values.as_deref().unwrap_or_default();
        set_message("Querying AOP-Wiki pathways...");
        let outcome = builder
            .query_by_identifier(args.query_type, values)
            .await
            .context("Pathway query failed")?;
        if let QueryOutcome::Executed { bindings, .. } = outcome {
            debug!("Pathway query returned {} rows", bindings);
        }
        format!("{}: {}", args.query_type, values)
    };

    if !options.is_empty() {
        set_message("Enriching network...");
        let report = builder.enrich(options).await;
        for (step, outcome) in &report.outcomes {
            match outcome {
                QueryOutcome::Executed { bindings, .. } => {
                    info!("Step {}: {} rows", step, bindings)
                }
                QueryOutcome::Skipped(reason) => info!("Step {} skipped: {}", step, reason),
            }
        }
        if !report.is_success() {
            warn!(
                "{} enrichment step(s) failed; the network is incomplete",
                report.failures.len()
            );
        }
    }

    Ok(source)
}

/// Serialize the network in the configured format.
fn render(network: &AopNetwork, config: &Config, source: &str) -> Result<String> {
    let output = &config.output;
    let content = match output.format {
        OutputFormat::Cytoscape => {
            serde_json::to_string_pretty(&network.to_cytoscape(output.include_styles))
                .context("Failed to serialize Cytoscape JSON")?
        }
        OutputFormat::Cx2 => {
            let options = Cx2Options {
                name: output.name.clone(),
                description: output.description.clone(),
                include_styles: output.include_styles,
                generated_at: Utc::now(),
            };
            serde_json::to_string_pretty(&to_cx2(network, &options))
                .context("Failed to serialize CX2")?
        }
        OutputFormat::Tables => serde_json::to_string_pretty(&NetworkTables::build(network))
            .context("Failed to serialize tables")?,
        OutputFormat::Markdown => {
            let metadata = ReportMetadata {
                title: output
                    .name
                    .clone()
                    .unwrap_or_else(|| "AOP Network Report".to_string()),
                description: output.description.clone(),
                source: source.to_string(),
                generated_at: Utc::now(),
            };
            generate_markdown_report(network, &metadata)
        }
    };
    Ok(content)
}

/// Write to `path` through a temporary file in the same directory, or to
/// stdout when no path is set.
fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    let Some(path) = path else {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", content).context("Failed to write to stdout")?;
        return Ok(());
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write output to {}", path.display()))?;
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
