//! Native CLI support for the covary binary.
//!
//! - [`args`]: clap argument definitions
//! - [`config`]: `covary.json` project files and option merging
//! - [`driver`]: loading assemblies, running the checker or a single query
//! - [`reporter`]: text rendering of diagnostics
//! - [`tracing_config`]: `COVARY_LOG` / `COVARY_LOG_FORMAT` subscriber setup

pub mod args;
pub mod config;
pub mod driver;
pub mod reporter;
pub mod tracing_config;

#[cfg(test)]
#[path = "../tests/args_tests.rs"]
mod args_tests;
#[cfg(test)]
#[path = "../tests/config_tests.rs"]
mod config_tests;
#[cfg(test)]
#[path = "../tests/reporter_tests.rs"]
mod reporter_tests;
#[cfg(test)]
#[path = "../tests/tracing_config_tests.rs"]
mod tracing_config_tests;
