//! Subscriber setup for the `boxblur` binary.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Base filter for a `-v` count. `RUST_LOG` takes precedence when set.
fn base_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "warn,boxblur=info,boxblur_compute=info,boxblur_io=info",
        2 => "info,boxblur=debug,boxblur_compute=debug,boxblur_io=debug",
        _ => "debug,boxblur=trace,boxblur_compute=trace,boxblur_io=trace",
    }
}

/// Install the global subscriber.
///
/// Logs go to stderr so they never mix with the interactive prompts on
/// stdout. With `log_file`, every event is also appended to that file
/// through a non-blocking writer; keep the returned guard alive until exit
/// or buffered lines are lost.
pub fn init(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(base_level(verbose)))
        .context("Invalid log filter")?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(verbose >= 2)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Logger initialization failed")?;

    Ok(guard)
}
