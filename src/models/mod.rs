//! Data models shared by the bridge, the watch relay and the flow.
//!
//! - [`RequestDescriptor`] / [`SyntheticResponse`]: a page request before send and the
//!   completed state the bridge fabricates for it
//! - [`AppEvent`] / [`FileChange`]: typed payloads for the page-wide event bus
//! - [`AppConfig`]: settings loaded from `helmad.yaml`

pub mod config;
pub mod events;
pub mod request;

pub use config::{
    AppConfig, BridgeSettings, EventSettings, LocalChartSettings, LoggingSettings,
    StartupSettings, WatchSettings,
};
pub use events::{AppEvent, FileChange};
pub use request::{
    InvocationArgs, ReadyState, RequestDescriptor, STATUS_COMMAND_FAILED, STATUS_OK,
    SyntheticResponse,
};
