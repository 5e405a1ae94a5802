use std::str::FromStr;

use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info,yatube_server=debug,sqlx=warn";

/// Output format of the log lines, picked with `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{}', expected json or pretty", other)),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = fmt()
        .with_env_filter(filter)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let installed = match format {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.with_target(false).json().finish())
        }
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish()),
    };
    if installed.is_err() {
        tracing::warn!("global subscriber already set, keeping it");
    }
}
