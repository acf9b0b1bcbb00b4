#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;

use covary_cli::args::{CliArgs, OutputFormat};
use covary_cli::reporter::Reporter;
use covary_cli::{config, driver, tracing_config};

const EXIT_SUCCESS: i32 = 0;
/// Errors were reported, or a query was rejected.
const EXIT_ERRORS: i32 = 1;

fn main() -> Result<()> {
    // Only installs a subscriber when COVARY_LOG or RUST_LOG is set.
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let options = config::resolve_options(&args, &cwd)?;
    let color = args
        .pretty
        .unwrap_or_else(|| std::io::stdout().is_terminal());
    let reporter = Reporter::new(color);

    if let Some((subtype, supertype)) = args.query() {
        let outcome = driver::run_query(&options, subtype, supertype)?;
        match args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
            OutputFormat::Text => print!("{}", reporter.render_query(&outcome)),
        }
        let code = if outcome.explanation.allowed {
            EXIT_SUCCESS
        } else {
            EXIT_ERRORS
        };
        std::process::exit(code);
    }

    let outcome = driver::run_check(&options)?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        OutputFormat::Text => print!("{}", reporter.render_outcome(&outcome)),
    }

    if outcome.error_count > 0 {
        if args.format == OutputFormat::Json {
            eprintln!("covary: {} error(s)", outcome.error_count);
        }
        std::process::exit(EXIT_ERRORS);
    }
    std::process::exit(EXIT_SUCCESS);
}
