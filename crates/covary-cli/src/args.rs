use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the covary binary.
#[derive(Parser, Debug)]
#[command(
    name = "covary",
    version,
    about = "Checks that member overrides in an API assembly are valid in every target language"
)]
pub struct CliArgs {
    /// Path to covary.json or a directory containing it.
    #[arg(short = 'p', long)]
    pub project: Option<PathBuf>,

    /// Assembly file to check.
    #[arg(short = 'a', long)]
    pub assembly: Option<PathBuf>,

    /// Dependency assembly file. May be repeated.
    #[arg(short = 'd', long = "dep")]
    pub dependencies: Vec<PathBuf>,

    /// Directory searched recursively for dependency assembly files (*.json).
    #[arg(long = "deps-dir")]
    pub dependency_dirs: Vec<PathBuf>,

    /// Let interface implementations narrow output types. Overrides the
    /// project file; `--allow-interface-covariance=false` turns it off.
    #[arg(
        long = "allow-interface-covariance",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub allow_interface_covariance: Option<bool>,

    /// Output format for diagnostics.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Colorize text output. Defaults to whether stdout is a terminal.
    #[arg(long)]
    pub pretty: Option<bool>,

    /// Overriding type for a single covariance query, as interchange JSON or `void`.
    #[arg(long = "sub", requires = "supertype")]
    pub subtype: Option<String>,

    /// Overridden type for a single covariance query, as interchange JSON or `void`.
    #[arg(long = "super", requires = "subtype")]
    pub supertype: Option<String>,
}

impl CliArgs {
    /// The `--sub`/`--super` pair, when running a single query.
    pub fn query(&self) -> Option<(&str, &str)> {
        match (&self.subtype, &self.supertype) {
            (Some(sub), Some(sup)) => Some((sub, sup)),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
