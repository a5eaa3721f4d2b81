use crate::models::LoggingSettings;
use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the level filter: `RUST_LOG` wins when set, otherwise debug or info.
fn level_filter(debug_mode: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_mode {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

fn ensure_log_dir(log_dir: &str) -> Result<()> {
    let log_path = Utf8Path::new(log_dir);
    if !log_path.exists() {
        fs::create_dir_all(log_path)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }
    Ok(())
}

/// Install the global subscriber described by the `logging` config section.
///
/// The file layer is plain text unless `settings.json` is set, in which case
/// each event is written as one JSON object per line.
///
/// # Errors
/// Fails when the log directory cannot be created or a global subscriber is
/// already installed.
pub fn setup_from_settings(
    settings: &LoggingSettings,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    ensure_log_dir(&settings.dir)?;

    // Create daily rotating file appender
    let file_appender = rolling::daily(&settings.dir, &settings.prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let (text_layer, json_layer) = if settings.json {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        (None, Some(layer))
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false) // No ANSI codes in log files
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        (Some(layer), None)
    };

    let console_layer = settings.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(level_filter(settings.debug))
        .with(text_layer)
        .with(json_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install global tracing subscriber")?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, debug={}, console={}, json={}",
        settings.dir,
        settings.prefix,
        settings.debug,
        settings.console,
        settings.json
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    #[allow(unused_variables)]
    fn test_setup_from_settings_creates_log_dir() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let settings = LoggingSettings {
            dir: log_dir.to_str().unwrap().to_string(),
            prefix: "test".to_string(),
            debug: false,
            console: false,
            json: false,
        };

        // A second global subscriber in the same process is an error,
        // but the directory is created either way
        let result = setup_from_settings(&settings);

        assert!(log_dir.exists());
    }

    #[test]
    fn test_ensure_log_dir_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("nested").join("logs");
        let log_dir = log_dir.to_str().unwrap();

        ensure_log_dir(log_dir).unwrap();
        ensure_log_dir(log_dir).unwrap();

        assert!(Utf8Path::new(log_dir).is_dir());
    }

    #[test]
    fn test_ensure_log_dir_rejects_file_path() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        let log_dir = blocker.join("logs");

        assert!(ensure_log_dir(log_dir.to_str().unwrap()).is_err());
    }
}
