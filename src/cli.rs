//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use pubchem_pug::pug::{DEFAULT_MAX_ATTEMPTS, DEFAULT_PUG_URL};
use pubchem_pug::{Compression, DownloadFormat, IdDatabase};

/// Download records from PubChem by ID.
///
/// Reads compound (or substance) IDs from INPUT, one per line, and writes the
/// bulk download produced by the PubChem Power User Gateway to OUTPUT.
#[derive(Parser, Debug)]
#[command(name = "pubchem-download-records")]
#[command(author, version)]
pub struct Args {
    /// File containing record IDs, one per line
    pub input: PathBuf,

    /// Output file (written as served, compressed unless `-c none`)
    pub output: PathBuf,

    /// Treat IDs as substance IDs instead of compound IDs
    #[arg(long)]
    pub sids: bool,

    /// Download format (text-asn, binary-asn, xml, sdf, image, image-small, smiles, inchi)
    #[arg(short = 'f', long, default_value_t = DownloadFormat::default())]
    pub format: DownloadFormat,

    /// Compression type (none, gzip, bzip2)
    #[arg(short = 'c', long, default_value_t = Compression::default())]
    pub compression: Compression,

    /// Download 3-D structures
    #[arg(long = "3d")]
    pub use_3d: bool,

    /// Number of conformers per compound when downloading 3-D structures
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub n_conformers: u32,

    /// Seconds to wait between status checks
    #[arg(short = 'd', long, default_value_t = 10)]
    pub delay: u64,

    /// Maximum retry attempts for transient failures (0-10)
    #[arg(short = 'r', long, default_value_t = (DEFAULT_MAX_ATTEMPTS - 1) as u8, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: u8,

    /// PUG endpoint URL
    #[arg(long, default_value = DEFAULT_PUG_URL, hide = true)]
    pub pug_url: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Database the input IDs belong to.
    pub fn database(&self) -> IdDatabase {
        if self.sids {
            IdDatabase::Substance
        } else {
            IdDatabase::Compound
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(extra: &[&str]) -> Result<Args, clap::Error> {
        let mut argv = vec!["pubchem-download-records", "ids.txt", "out.sdf.gz"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv)
    }

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.input, PathBuf::from("ids.txt"));
        assert_eq!(args.output, PathBuf::from("out.sdf.gz"));
        assert!(!args.sids);
        assert_eq!(args.format, DownloadFormat::Sdf);
        assert_eq!(args.compression, Compression::Gzip);
        assert!(!args.use_3d);
        assert_eq!(args.n_conformers, 1);
        assert_eq!(args.delay, 10);
        assert_eq!(args.max_retries, 2);
        assert_eq!(args.pug_url, DEFAULT_PUG_URL);
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_missing_output_rejected() {
        let result = Args::try_parse_from(["pubchem-download-records", "ids.txt"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_format_and_compression_flags() {
        let args = parse(&["-f", "smiles", "--compression", "none"]).unwrap();
        assert_eq!(args.format, DownloadFormat::Smiles);
        assert_eq!(args.compression, Compression::None);
    }

    #[test]
    fn test_cli_format_case_insensitive() {
        let args = parse(&["--format", "SDF"]).unwrap();
        assert_eq!(args.format, DownloadFormat::Sdf);
    }

    #[test]
    fn test_cli_unknown_format_rejected() {
        let err = parse(&["-f", "bogus"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_unknown_compression_rejected() {
        let err = parse(&["-c", "zip"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_3d_and_conformers() {
        let args = parse(&["--3d", "-n", "5"]).unwrap();
        assert!(args.use_3d);
        assert_eq!(args.n_conformers, 5);
    }

    #[test]
    fn test_cli_zero_conformers_rejected() {
        let err = parse(&["-n", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_sids_selects_substance_database() {
        assert_eq!(parse(&[]).unwrap().database(), IdDatabase::Compound);
        assert_eq!(parse(&["--sids"]).unwrap().database(), IdDatabase::Substance);
    }

    #[test]
    fn test_cli_delay_flag() {
        let args = parse(&["-d", "1"]).unwrap();
        assert_eq!(args.delay, 1);
    }

    #[test]
    fn test_cli_max_retries_over_max_rejected() {
        let err = parse(&["-r", "11"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        assert_eq!(parse(&["-v"]).unwrap().verbose, 1);
        assert_eq!(parse(&["-vv"]).unwrap().verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        assert!(parse(&["--quiet"]).unwrap().quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["pubchem-download-records", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_help_uses_command_description() {
        let help = Args::command().render_help().to_string();
        assert!(help.contains("Download records from PubChem by ID."), "{help}");
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["pubchem-download-records", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let err = parse(&["--invalid-flag"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
