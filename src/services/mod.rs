//! Services module - The collaborators behind the page-side bridge.
//!
//! The services here are **framework-agnostic**: no page or window types, only
//! the seams to the native side and the pure codec between them.
//!
//! # Components
//!
//! - [`codec`]: form-urlencoded parameter blob <-> [`InvocationArgs`](crate::models::InvocationArgs)
//! - [`CommandInvoker`]: async call-by-name channel to the backend, with
//!   [`CommandRegistry`] as an in-process implementation
//! - [`DirectoryPicker`]: native single-directory dialog ([`NativeDirectoryPicker`] on `rfd`)
//! - [`FileWatchRelay`]: native recursive watch ([`NotifyFileWatcher`] on `notify`)
//!   fanned out onto the event bus, with idempotent [`WatchSubscription::stop`]
//!
//! # Usage Example
//!
//! ```ignore
//! use helmad_bridge::services::{codec, CommandInvoker, CommandRegistry};
//!
//! let mut registry = CommandRegistry::new();
//! registry.register("home", |_args| async move { Ok(serde_json::json!("<h1>home</h1>")) });
//!
//! let body = registry.invoke("home", codec::decode("")).await?;
//! ```

pub mod codec;
pub mod invoker;
pub mod picker;
pub mod watch;

pub use invoker::{CommandInvoker, CommandRegistry, InvokeError};
pub use picker::{DirectoryPicker, NativeDirectoryPicker};
pub use watch::{
    BatchSink, FileWatchRelay, FileWatcher, NotifyFileWatcher, WatchError, WatchSubscription,
    dispatch_batch,
};
