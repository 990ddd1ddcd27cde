use std::ffi::OsString;
use std::path::PathBuf;
use clap::{Parser, Subcommand, Args};
use crate::pipeline::state::{EmptyPortPolicy, FailurePolicy};

#[derive(Parser)]
#[command(name = "genmap", version, about = "Automated multi-phase nmap reconnaissance")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the TCP, UDP and vulnerability phases against a target
    Scan(ScanArgs),
    /// Classify a saved scan output file and print advisories
    Parse(ParseArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone, Default)]
pub struct ScanArgs {
    /// Single host, IP or range to scan
    #[arg(short, long, conflicts_with = "input_list")]
    pub target: Option<String>,

    /// File with one target per line (passed to nmap as -iL)
    #[arg(short, long, visible_alias = "iL")]
    pub input_list: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for scan output files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Per-phase timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// What to do when a phase fails: abort, continue
    #[arg(long)]
    pub on_failure: Option<FailurePolicy>,

    /// Vulnerability phase behavior when TCP finds no ports: skip, all-ports, empty
    #[arg(long)]
    pub empty_ports: Option<EmptyPortPolicy>,

    /// Run nmap directly instead of through the elevation program
    #[arg(long)]
    pub no_elevate: bool,

    /// Directory of additional advisory YAML files
    #[arg(long)]
    pub knowledge: Option<PathBuf>,

    /// Path to the nmap binary
    #[arg(long)]
    pub nmap: Option<String>,

    /// Write a markdown summary of the run next to the scan files
    #[arg(long)]
    pub report: bool,

    /// Skip the startup banner
    #[arg(long)]
    pub no_banner: bool,
}

#[derive(Args, Clone)]
pub struct ParseArgs {
    /// Saved scan output to classify
    pub file: PathBuf,

    /// Directory of additional advisory YAML files
    #[arg(long)]
    pub knowledge: Option<PathBuf>,

    /// Print findings and advisories as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: PathBuf,
}

/// Rewrite nmap's single-dash `-iL` into the long flag clap understands.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| if arg == "-iL" { OsString::from("--input-list") } else { arg })
        .collect()
}
