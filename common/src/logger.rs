use std::fs;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_DIR: &str = "logs";
const DEFAULT_FILTER: &str = "attendai=info,services=info,db=info";

/// Installs the global tracing subscriber.
///
/// Events always go to a daily-rolling file under `logs/`; `log_to_stdout`
/// adds a coloured stdout layer. The returned guard must be held for the
/// lifetime of the process or buffered lines are lost on exit.
pub fn init_logging(log_file: &str, log_level: &str, log_to_stdout: bool) -> WorkerGuard {
    fs::create_dir_all(LOG_DIR).ok();

    let file_appender = rolling::daily(LOG_DIR, log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if log_to_stdout {
        let stdout_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true);
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    let log_path = format!("{LOG_DIR}/{log_file}");
    tracing::info!(
        file = %log_path,
        filter = log_level,
        stdout = log_to_stdout,
        "logging initialised"
    );

    guard
}
