//! Recursive file-watch relay.
//!
//! The native watch facility reports changes in batches. [`FileWatchRelay`] fans each
//! batch out as one [`AppEvent::TemplateFileChanged`] per record, in arrival order,
//! with no debouncing or deduplication. A burst of native events reaches the bus
//! unfiltered.
//!
//! Every subscription is a [`WatchSubscription`] whose [`stop`](WatchSubscription::stop)
//! releases the native watch at most once. The relay also ties each subscription to
//! the bus's [`AppEvent::StopFileWatch`] signal.

use crate::models::{AppEvent, FileChange};
use crate::ui::EventBus;
use camino::{Utf8Path, Utf8PathBuf};
use notify::{RecursiveMode, Watcher};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;

/// Errors raised while establishing a file watch
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Watch root does not exist or is not a directory: {0}")]
    MissingRoot(Utf8PathBuf),

    #[error("Failed to create file watcher: {0}")]
    Create(String),

    #[error("Failed to watch {path}: {message}")]
    Watch { path: Utf8PathBuf, message: String },
}

/// Receives each native batch, in order, on the watcher's thread
pub type BatchSink = Arc<dyn Fn(Vec<FileChange>) + Send + Sync>;

type Teardown = Box<dyn FnOnce() + Send>;

/// Native recursive watch facility
pub trait FileWatcher: Send + Sync {
    /// Start delivering change batches under `root` to `sink`.
    ///
    /// Must fail rather than return a subscription that never fires.
    fn watch(
        &self,
        root: &Utf8Path,
        recursive: bool,
        sink: BatchSink,
    ) -> Result<WatchSubscription, WatchError>;
}

/// An active watch and its cancellation handle
pub struct WatchSubscription {
    root: Utf8PathBuf,
    recursive: bool,
    teardown: Mutex<Option<Teardown>>,
    stopped_tx: watch::Sender<bool>,
}

impl WatchSubscription {
    /// Wrap a native watch. `teardown` runs on the first [`stop`](Self::stop) only.
    pub fn new(
        root: impl Into<Utf8PathBuf>,
        recursive: bool,
        teardown: impl FnOnce() + Send + 'static,
    ) -> Self {
        let (stopped_tx, _) = watch::channel(false);
        Self {
            root: root.into(),
            recursive,
            teardown: Mutex::new(Some(Box::new(teardown))),
            stopped_tx,
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped_tx.borrow()
    }

    /// Deregister the native watch.
    ///
    /// Safe to call any number of times.
    ///
    /// # Returns
    /// `true` if this call released the watch, `false` if it was already stopped
    pub fn stop(&self) -> bool {
        let teardown = self
            .teardown
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match teardown {
            Some(teardown) => {
                teardown();
                self.stopped_tx.send_replace(true);
                tracing::info!("Stopped watching {}", self.root);
                true
            }
            None => {
                tracing::debug!("Watch on {} already stopped", self.root);
                false
            }
        }
    }

    /// Resolves once the subscription has been stopped
    pub async fn stopped(&self) {
        let mut rx = self.stopped_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

impl std::fmt::Debug for WatchSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSubscription")
            .field("root", &self.root)
            .field("recursive", &self.recursive)
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// [`FileWatcher`] backed by the platform's recommended `notify` watcher
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyFileWatcher;

impl FileWatcher for NotifyFileWatcher {
    fn watch(
        &self,
        root: &Utf8Path,
        recursive: bool,
        sink: BatchSink,
    ) -> Result<WatchSubscription, WatchError> {
        if !root.is_dir() {
            return Err(WatchError::MissingRoot(root.to_path_buf()));
        }

        let mut watcher = notify::recommended_watcher(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) if !event.paths.is_empty() => {
                    sink(event.paths.into_iter().map(FileChange::from).collect());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("File watch error: {}", e),
            },
        )
        .map_err(|e| WatchError::Create(e.to_string()))?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(root.as_std_path(), mode)
            .map_err(|e| WatchError::Watch {
                path: root.to_path_buf(),
                message: e.to_string(),
            })?;

        let watched = root.to_path_buf();
        Ok(WatchSubscription::new(root, recursive, move || {
            if let Err(e) = watcher.unwatch(watched.as_std_path()) {
                tracing::debug!("Unwatch of {} reported: {}", watched, e);
            }
        }))
    }
}

/// Publish one [`AppEvent::TemplateFileChanged`] per record, in order.
///
/// # Returns
/// The number of events published
pub fn dispatch_batch(bus: &EventBus, batch: Vec<FileChange>) -> usize {
    let count = batch.len();
    for change in batch {
        tracing::debug!("Template file changed: {}", change.path.display());
        bus.publish(AppEvent::TemplateFileChanged { path: change.path });
    }
    count
}

/// Connects a [`FileWatcher`] to the application event bus
#[derive(Clone)]
pub struct FileWatchRelay {
    watcher: Arc<dyn FileWatcher>,
    bus: EventBus,
    recursive: bool,
}

impl FileWatchRelay {
    pub fn new(watcher: Arc<dyn FileWatcher>, bus: EventBus, recursive: bool) -> Self {
        Self {
            watcher,
            bus,
            recursive,
        }
    }

    /// Watch `root` and relay its changes to the bus.
    ///
    /// The returned subscription is also stopped when anyone publishes
    /// [`AppEvent::StopFileWatch`]. Must run inside a tokio runtime.
    pub async fn start_watch(&self, root: &Utf8Path) -> Result<Arc<WatchSubscription>, WatchError> {
        let bus = self.bus.clone();
        let sink: BatchSink = Arc::new(move |batch| {
            dispatch_batch(&bus, batch);
        });

        let subscription = Arc::new(self.watcher.watch(root, self.recursive, sink)?);
        tracing::info!(
            "Watching {} (recursive: {})",
            subscription.root(),
            subscription.is_recursive()
        );

        self.stop_on_signal(Arc::clone(&subscription));
        Ok(subscription)
    }

    fn stop_on_signal(&self, subscription: Arc<WatchSubscription>) {
        // Take the receiver before spawning so a signal raised right after start is not missed
        let mut stops = self.bus.stop_signals();

        tokio::spawn(async move {
            tokio::select! {
                _ = subscription.stopped() => {}
                changed = stops.changed() => {
                    if changed.is_ok() {
                        subscription.stop();
                    }
                }
            }
        });
    }
}
