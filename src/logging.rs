use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

/// Installs the global tracing subscriber
///
/// Events go to stdout in a human-readable format. When `log_dir` is given,
/// they are also written as JSON lines to a daily-rolling `tablerank.log`
/// file in that directory.
///
/// `RUST_LOG` overrides the default level (`info`, or `debug` when `debug`
/// is set).
///
/// ### Returns
///
/// The guard of the non-blocking file writer. It must be held for as long as
/// the process logs, or buffered lines are lost.
pub fn init_logging(debug: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let stdout_layer = fmt::layer().with_target(false).boxed();

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "tablerank.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init();

    if let Err(e) = result {
        // Only happens when a subscriber is already installed, e.g. in tests
        eprintln!("Logging already initialized: {}", e);
    }

    guard
}
