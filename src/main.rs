//! helmad-bridge - Headless driver for the helmad request bridge
//!
//! # Overview
//!
//! This binary wires the library pieces together outside a web view:
//! - Configuration loading ([`ConfigManager`], `helmad.yaml` + `HELMAD__*` env)
//! - Logging infrastructure (file rotation + optional console output)
//! - Tokio async runtime
//! - An in-process [`CommandRegistry`] standing in for the native backend
//! - The [`PageController`] (bridge, event bus, local chart flow)
//!
//! # Execution Flow
//!
//! 1. Load configuration from the platform config dir (or `helmad Data/`)
//! 2. Initialize logging -> logs/helmad.<date>
//! 3. Create tokio runtime
//! 4. Boot the page controller (libraries ready, splash dismissed after delay)
//! 5. Run the local chart flow once through the native directory picker
//! 6. Log template file changes until Ctrl-C
//! 7. Raise the stop-watch signal and shut the runtime down with a 5s timeout

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use directories::ProjectDirs;
use helmad_bridge::models::{AppEvent, InvocationArgs};
use helmad_bridge::services::{CommandRegistry, NativeDirectoryPicker, NotifyFileWatcher};
use helmad_bridge::{APP_NAME, ConfigManager, PageController, VERSION};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

/// Fallback config directory when the platform has no project dirs
const LOCAL_CONFIG_DIR: &str = "helmad Data";

fn config_dir() -> Utf8PathBuf {
    ProjectDirs::from("io", "helmad", "helmad")
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok())
        .unwrap_or_else(|| Utf8PathBuf::from(LOCAL_CONFIG_DIR))
}

/// Placeholder backend commands; a real host forwards these to its native side.
fn backend_commands() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry
        .register("close_splashscreen", |_args| async move {
            Ok::<Value, String>(Value::Null)
        })
        .register("template", |args: InvocationArgs| async move {
            let chart = args.get("chart").cloned().unwrap_or_default();
            Ok::<Value, String>(json!(format!("# rendered templates for {}", chart)))
        })
        .register("local_chart", |args: InvocationArgs| async move {
            let chart = args
                .get("chart")
                .or_else(|| args.get("path"))
                .cloned()
                .unwrap_or_default();
            let name = args.get("name").cloned().unwrap_or_default();
            Ok::<Value, String>(json!({
                "chart": chart,
                "name": name,
                "local": args.get("local").is_some_and(|flag| flag == "true"),
            }))
        });

    registry
}

fn main() -> Result<()> {
    let config_manager = ConfigManager::new(config_dir())?;
    let config = config_manager.load()?;

    let _log_guard = helmad_bridge::logging::setup_from_settings(&config.logging)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!("Configuration loaded from {}", config_manager.config_path());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("helmad-worker")
        .build()
        .context("Failed to build tokio runtime")?;

    let registry = backend_commands();
    tracing::info!("Backend commands registered: {:?}", registry.commands());

    let controller = PageController::new(
        config,
        Arc::new(registry),
        Arc::new(NativeDirectoryPicker::default()),
        Arc::new(NotifyFileWatcher),
        runtime.handle().clone(),
    );

    let result = runtime.block_on(run(&controller));

    controller.request_stop_watch();
    // The relay task may not get scheduled again before shutdown
    controller.flow().stop_watch();
    runtime.shutdown_timeout(Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result
}

async fn run(controller: &PageController) -> Result<()> {
    let mut events = controller.bus().subscribe();
    let splash = controller.boot();

    match controller.flow().render_local_chart().await? {
        Some(rendered) => tracing::info!("Local chart rendered: {}", rendered),
        None => {
            tracing::info!("No chart directory selected, exiting");
            splash.await.context("Splash task panicked")?;
            return Ok(());
        }
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(AppEvent::TemplateFileChanged { path }) => {
                    tracing::info!("Template file changed: {}", path.display());
                }
                Ok(other) => tracing::debug!("Event {}", other.name()),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event listener lagged, {} event(s) skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                tracing::info!("Interrupted, stopping");
                break;
            }
        }
    }

    Ok(())
}
