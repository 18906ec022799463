//! Logging initialization.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::LogFormat;

/// File name prefix of the rolling log files
const LOG_FILE_PREFIX: &str = "stargazer.log";

/// Installs the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the default level, which is `info`, or
/// `debug` when `debug` is set. Events go to stdout in the chosen format and,
/// when `log_dir` is given, to a daily rolling JSON file in that directory.
///
/// ### Returns
///
/// The guard flushing the file writer; keep it alive for the life of the
/// process
pub fn init_logging(format: LogFormat, debug: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    layers.push(match format {
        LogFormat::Json => fmt::layer().json().boxed(),
        LogFormat::Pretty => fmt::layer().boxed(),
    });

    let guard = log_dir.map(|dir| {
        let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(fmt::layer().json().with_ansi(false).with_writer(writer).boxed());
        guard
    });

    if let Err(err) = tracing_subscriber::registry().with(layers).with(filter).try_init() {
        eprintln!("Logging already initialized: {}", err);
    }

    guard
}
