use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable that overrides the configured log filter.
pub const LOG_ENV_VAR: &str = "MEDIATIDY_LOG";

/// Installs the global subscriber: stderr always, plus `file` when given.
///
/// `level` is any `EnvFilter` directive (`"info"`, `"mediatidy=debug"`).
/// The returned guard flushes the file writer on drop and must be kept alive
/// for the life of the program.
pub fn init_logging(level: &str, file: Option<&Path>) -> Option<WorkerGuard> {
    let filter_layer =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path.file_name().unwrap_or_else(|| "mediatidy.log".as_ref());
            let file_appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(file_layer)
        .with(filter_layer)
        .try_init();

    if result.is_err() {
        tracing::debug!("global subscriber already installed");
    }

    guard
}
