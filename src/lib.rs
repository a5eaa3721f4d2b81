// helmad-bridge - Command bridge and file-watch relay for the helmad chart previewer
//
// This is the library crate containing the bridge, the watch relay and the
// local chart flow. The binary crate (main.rs) provides a headless driver.

pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{AppConfig, AppEvent, RequestDescriptor, SyntheticResponse};
pub use state::{FlowPhase, FlowState};
pub use ui::{PageController, RequestBridge, Route};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
