//! Tracing setup for the `covary` binary.
//!
//! Output format is chosen by `COVARY_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented span hierarchy via `tracing-tree`
//! - `json`: one JSON object per span/event
//!
//! ```bash
//! COVARY_LOG=debug covary --assembly dist/assembly.json
//! COVARY_LOG="covary_solver=trace" COVARY_LOG_FORMAT=tree \
//!     covary --sub '{"fqn":"pkg.Dog"}' --super '{"fqn":"pkg.Animal"}'
//! ```
//!
//! Nothing is installed unless `COVARY_LOG` or `RUST_LOG` is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

pub const LOG_ENV: &str = "COVARY_LOG";
pub const LOG_FORMAT_ENV: &str = "COVARY_LOG_FORMAT";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Parse a `COVARY_LOG_FORMAT` value. Unknown values fall back to text.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// The output half of the subscriber. Every format writes to stderr so
    /// JSON reports on stdout stay parseable.
    fn output_layer(self) -> BoxedLayer {
        match self {
            Self::Tree => tracing_tree::HierarchicalLayer::new(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_targets(true)
                .boxed(),
            Self::Json => fmt::layer().json().with_writer(std::io::stderr).boxed(),
            Self::Text => fmt::layer().with_writer(std::io::stderr).boxed(),
        }
    }
}

/// Filter directives and format for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingSettings {
    /// `RUST_LOG` syntax, e.g. `covary_checker=debug`.
    pub directives: String,
    pub format: LogFormat,
}

impl TracingSettings {
    /// `None` when neither variable is set. `COVARY_LOG` wins over `RUST_LOG`.
    pub fn resolve(
        covary_log: Option<String>,
        rust_log: Option<String>,
        format: Option<String>,
    ) -> Option<Self> {
        let directives = covary_log.or(rust_log)?;
        let format = format.as_deref().map_or(LogFormat::Text, LogFormat::parse);
        Some(Self { directives, format })
    }

    pub fn from_env() -> Option<Self> {
        Self::resolve(
            std::env::var(LOG_ENV).ok(),
            std::env::var("RUST_LOG").ok(),
            std::env::var(LOG_FORMAT_ENV).ok(),
        )
    }

    /// Output layer for the chosen format, filtered by the directives.
    pub fn into_layer(self) -> BoxedLayer {
        let filter = EnvFilter::builder().parse_lossy(&self.directives);
        self.format.output_layer().with_filter(filter).boxed()
    }
}

/// Install the global subscriber when tracing was requested.
pub fn init_tracing() {
    let Some(settings) = TracingSettings::from_env() else {
        return;
    };
    Registry::default().with(settings.into_layer()).init();
}
