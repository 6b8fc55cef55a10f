//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fetch and locally archive PDF reprints of PubMed articles.
///
/// PDFetch resolves PubMed IDs, PMC IDs, and DOIs to PDF reprints through
/// publisher-specific finder strategies and stores them one file per
/// identifier.
#[derive(Parser, Debug)]
#[command(name = "pdfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Reprint store directory
    #[arg(short = 'd', long, global = true, default_value = ".")]
    pub dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands mirroring the resolution, cache-probe, and catalog
/// operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve identifiers to PDF reprints and store them
    Fetch {
        /// Identifiers to resolve (PubMed IDs, PMC IDs, or DOIs)
        #[arg(required = true)]
        ids: Vec<String>,

        /// Already-known article page URL (single identifier only)
        #[arg(long)]
        url: Option<String>,

        /// Maximum concurrent resolutions (1-16)
        #[arg(short = 'c', long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=16))]
        concurrency: u8,
    },

    /// Report whether a reprint is already stored (no network)
    Check {
        /// Identifier to probe
        id: String,
    },

    /// List stored reprints
    List {
        /// Emit the catalog as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a stored reprint
    Remove {
        /// Identifier to delete
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_fetch_parses_ids_and_defaults() {
        let args = Args::try_parse_from(["pdfetch", "fetch", "12345678", "PMC123"]).unwrap();
        match args.command {
            Command::Fetch {
                ids,
                url,
                concurrency,
            } => {
                assert_eq!(ids, vec!["12345678", "PMC123"]);
                assert!(url.is_none());
                assert_eq!(concurrency, 4);
            }
            other => panic!("expected fetch command, got {other:?}"),
        }
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.dir, std::path::Path::new("."));
    }

    #[test]
    fn test_cli_fetch_requires_at_least_one_id() {
        let result = Args::try_parse_from(["pdfetch", "fetch"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_concurrency_range_enforced() {
        assert!(Args::try_parse_from(["pdfetch", "fetch", "1", "-c", "16"]).is_ok());
        let result = Args::try_parse_from(["pdfetch", "fetch", "1", "-c", "0"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
        let result = Args::try_parse_from(["pdfetch", "fetch", "1", "-c", "17"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_global_dir_flag_after_subcommand() {
        let args = Args::try_parse_from(["pdfetch", "check", "12345678", "--dir", "/tmp/r"]).unwrap();
        assert_eq!(args.dir, std::path::Path::new("/tmp/r"));
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["pdfetch", "-vv", "list"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_help_and_version_flags() {
        let err = Args::try_parse_from(["pdfetch", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
        let err = Args::try_parse_from(["pdfetch", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_list_json_flag() {
        let args = Args::try_parse_from(["pdfetch", "list", "--json"]).unwrap();
        match args.command {
            Command::List { json } => assert!(json),
            other => panic!("expected list command, got {other:?}"),
        }
    }
}
