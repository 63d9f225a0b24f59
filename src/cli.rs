use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tripwire::patterns::{Category, Severity};
use tripwire::utils::OutputFormat;

#[derive(Parser)]
#[command(name = "tripwire")]
#[command(about = "A static scanner for malicious and vulnerable Solidity patterns")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a contract file or a directory of contracts
    Scan {
        /// Path to scan (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip patterns below this severity
        #[arg(long, value_enum)]
        min_severity: Option<Severity>,

        /// Only run these categories (repeatable)
        #[arg(short = 'c', long = "category")]
        categories: Vec<Category>,

        /// Never run this pattern id (repeatable)
        #[arg(long = "disable", value_name = "PATTERN_ID")]
        disabled: Vec<String>,

        /// Exit with status 1 if any finding is at or above this severity
        #[arg(long, value_enum)]
        fail_on: Option<Severity>,

        /// Run patterns one after another instead of in parallel
        #[arg(long)]
        sequential: bool,
    },

    /// List the built-in patterns
    Patterns {
        /// Only list this category
        #[arg(short, long)]
        category: Option<Category>,

        /// Show descriptions and recommendations
        #[arg(short, long)]
        verbose: bool,
    },
}

#[test]
fn parses_scan_flags() {
    let cli = Cli::try_parse_from([
        "tripwire", "scan", "contracts", "-f", "json", "--min-severity", "medium",
        "-c", "minting", "-c", "access_control", "--disable", "time-lock", "--fail-on", "high",
    ])
    .unwrap();
    let Commands::Scan {
        path,
        format,
        min_severity,
        categories,
        disabled,
        fail_on,
        sequential,
        output,
    } = cli.command
    else {
        panic!("expected scan");
    };
    assert_eq!(path, PathBuf::from("contracts"));
    assert_eq!(format, Some(OutputFormat::Json));
    assert_eq!(min_severity, Some(Severity::Medium));
    assert_eq!(categories, [Category::Minting, Category::AccessControl]);
    assert_eq!(disabled, ["time-lock"]);
    assert_eq!(fail_on, Some(Severity::High));
    assert!(!sequential);
    assert!(output.is_none());
}

#[test]
fn rejects_unknown_category() {
    assert!(Cli::try_parse_from(["tripwire", "scan", "-c", "bytecode"]).is_err());
    assert!(Cli::try_parse_from(["tripwire", "patterns", "-c", "honeypot", "-v"]).is_ok());
}
