//! Logging subscriber initialisation.

use anyhow::anyhow;
use clap::Args;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence when set
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    log_format: LogFormat,
}

impl LoggingArgs {
    /// Install the global subscriber. Logs go to stderr so tables on stdout stay clean.
    pub(crate) fn init(&self) -> anyhow::Result<()> {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(self.build_env_filter())
            .with_writer(std::io::stderr)
            .with_target(true);

        let installed = match self.log_format {
            LogFormat::Compact => builder.compact().try_init(),
            LogFormat::Json => builder.json().with_current_span(true).try_init(),
        };

        installed.map_err(|err| anyhow!("failed to initialise logging: {err}"))
    }

    fn build_env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level))
    }
}
