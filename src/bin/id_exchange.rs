//! Map registry identifiers (ChEMBL, ZINC, ...) onto PubChem identifiers.
//!
//! Usage:
//!   pubchem-id-exchange ids.txt [-s SOURCE] [-m] [-p PREFIX] [--sids]
//!
//! Writes `{prefix}-mapping.txt` (`source<TAB>destination`) with `-m`, otherwise
//! `{prefix}-matched.txt` (one destination per line). Source IDs without a
//! match go to `{prefix}-unmatched.txt`, which is only written when non-empty.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use pubchem_pug::pubchem::parse_source_ids;
use pubchem_pug::pug::{DEFAULT_PUG_URL, DEFAULT_REST_URL};
use pubchem_pug::{
    Endpoints, ExchangeOperation, ExchangeOutput, IdExchangeQuery, IdMapping, PubChem, PugConfig,
};
use tracing::{debug, info};

/// Default prefix for output files.
const DEFAULT_PREFIX: &str = "id-exchange";

/// Use the PubChem Identifier Exchange service.
#[derive(Parser, Debug)]
#[command(name = "pubchem-id-exchange")]
#[command(author, version)]
struct Args {
    /// File containing source IDs, one per line
    input: PathBuf,

    /// Source registry of the input IDs (inferred from the first ID if omitted)
    #[arg(short = 's', long)]
    source: Option<String>,

    /// Write the full source-to-destination mapping instead of matched IDs only
    #[arg(short = 'm', long)]
    mapping: bool,

    /// Prefix for output files
    #[arg(short = 'p', long, default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Return substance IDs instead of compound IDs
    #[arg(long)]
    sids: bool,

    /// Seconds to wait between status checks
    #[arg(short = 'd', long, default_value_t = 10)]
    delay: u64,

    /// PUG endpoint URL
    #[arg(long, default_value = DEFAULT_PUG_URL, hide = true)]
    pug_url: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn output(&self) -> ExchangeOutput {
        if self.sids {
            ExchangeOutput::Sid
        } else {
            ExchangeOutput::Cid
        }
    }

    fn output_path(&self, suffix: &str) -> PathBuf {
        PathBuf::from(format!("{}-{suffix}.txt", self.prefix))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
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
    let ids = parse_source_ids(&input);
    if ids.is_empty() {
        bail!("no source IDs found in {}", args.input.display());
    }
    info!(ids = ids.len(), "Read source IDs");

    let query = IdExchangeQuery::new(
        ids,
        args.source.as_deref(),
        ExchangeOperation::Same,
        args.output(),
    )
    .context("invalid identifier exchange request")?;

    let config = PugConfig::default()
        .with_poll_interval(Duration::from_secs(args.delay))
        .with_endpoints(Endpoints::new(args.pug_url.as_str(), DEFAULT_REST_URL));
    let mapping = PubChem::new(config)
        .id_exchange(&query)
        .await
        .context("identifier exchange failed")?;

    write_results(&args, &mapping)?;
    Ok(())
}

fn write_results(args: &Args, mapping: &IdMapping) -> Result<()> {
    let mut matched = String::new();
    for (source, destination) in mapping.matched() {
        if args.mapping {
            let _ = writeln!(matched, "{source}\t{destination}");
        } else {
            let _ = writeln!(matched, "{destination}");
        }
    }
    let matched_path = args.output_path(if args.mapping { "mapping" } else { "matched" });
    write_file(&matched_path, &matched)?;

    let unmatched: Vec<&str> = mapping.unmatched().collect();
    if !unmatched.is_empty() {
        let mut contents = unmatched.join("\n");
        contents.push('\n');
        write_file(&args.output_path("unmatched"), &contents)?;
    }

    info!(
        matched = mapping.len() - unmatched.len(),
        unmatched = unmatched.len(),
        output = %matched_path.display(),
        "Identifier exchange complete"
    );
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_help_uses_command_description() {
        let help = Args::command().render_help().to_string();
        assert!(help.contains("Use the PubChem Identifier Exchange service."), "{help}");
    }

    #[test]
    fn test_cli_defaults() {
        let args = Args::try_parse_from(["pubchem-id-exchange", "ids.txt"]).unwrap();
        assert_eq!(args.input, PathBuf::from("ids.txt"));
        assert_eq!(args.source, None);
        assert!(!args.mapping);
        assert_eq!(args.prefix, "id-exchange");
        assert_eq!(args.output(), ExchangeOutput::Cid);
        assert_eq!(args.delay, 10);
    }

    #[test]
    fn test_cli_all_flags() {
        let args = Args::try_parse_from([
            "pubchem-id-exchange",
            "ids.txt",
            "-s",
            "ChEMBL",
            "-m",
            "-p",
            "run1",
            "--sids",
            "-d",
            "2",
        ])
        .unwrap();
        assert_eq!(args.source.as_deref(), Some("ChEMBL"));
        assert!(args.mapping);
        assert_eq!(args.output(), ExchangeOutput::Sid);
        assert_eq!(args.output_path("mapping"), PathBuf::from("run1-mapping.txt"));
        assert_eq!(args.delay, 2);
    }

    #[test]
    fn test_cli_missing_input_rejected() {
        let err = Args::try_parse_from(["pubchem-id-exchange"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
