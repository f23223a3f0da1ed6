//! CLI entry point for bulk PubChem record downloads.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use pubchem_pug::pubchem::parse_id_list;
use pubchem_pug::pug::DEFAULT_REST_URL;
use pubchem_pug::{Endpoints, PubChem, PugConfig, RecordsQuery};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let input = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read ID file {}", args.input.display()))?;
    let ids = parse_id_list(&input)
        .with_context(|| format!("invalid ID file {}", args.input.display()))?;
    if ids.is_empty() {
        bail!("no record IDs found in {}", args.input.display());
    }
    info!(ids = ids.len(), database = args.database().id_name(), "Read record IDs");

    let query = RecordsQuery::new(ids)
        .database(args.database())
        .format(args.format)
        .compression(args.compression)
        .use_3d(args.use_3d)
        .n_conformers(args.n_conformers);

    let config = PugConfig::default()
        .with_poll_interval(Duration::from_secs(args.delay))
        .with_max_attempts(u32::from(args.max_retries) + 1)
        .with_endpoints(Endpoints::new(args.pug_url.as_str(), DEFAULT_REST_URL));
    let pubchem = PubChem::new(config);

    pubchem
        .get_records(&query, Some(&args.output))
        .await
        .context("record download failed")?;

    info!(output = %args.output.display(), "Download complete");
    Ok(())
}
