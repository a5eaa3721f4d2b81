// Page Controller - Wires the request bridge, event bus and local chart flow
//
// This module contains the PageController which coordinates between:
// - RequestBridge (command-prefixed requests -> command invoker)
// - EventBus (page-wide application events)
// - ConfirmConfigureFlow (directory pick -> watch -> configured request)
//
// It also runs the startup sequence: install the bridge, announce that the
// libraries are ready, then dismiss the splash screen after a short delay.

use crate::models::{AppConfig, AppEvent, InvocationArgs, RequestDescriptor};
use crate::services::invoker::CommandInvoker;
use crate::services::picker::DirectoryPicker;
use crate::services::watch::{FileWatchRelay, FileWatcher};
use crate::ui::bridge::{RequestBridge, Route};
use crate::ui::events::EventBus;
use crate::ui::flow::{ConfirmConfigureFlow, ConfirmOutcome, FlowError};
use std::sync::Arc;
use std::time::Duration;

/// Page-side coordinator for one application window
///
/// # Example
/// ```ignore
/// let controller = PageController::new(
///     config,
///     Arc::new(registry),
///     Arc::new(NativeDirectoryPicker::default()),
///     Arc::new(NotifyFileWatcher),
///     runtime.handle().clone(),
/// );
/// controller.boot();
/// ```
pub struct PageController {
    config: AppConfig,
    invoker: Arc<dyn CommandInvoker>,
    bus: EventBus,
    bridge: RequestBridge,
    flow: Arc<ConfirmConfigureFlow>,
    tokio_handle: tokio::runtime::Handle,
}

impl PageController {
    /// Create a new page controller
    ///
    /// # Arguments
    /// * `config` - Application configuration
    /// * `invoker` - Channel to the native backend commands
    /// * `picker` - Native directory picker
    /// * `watcher` - Native recursive file watch facility
    /// * `tokio_handle` - Handle to the tokio runtime for startup tasks
    pub fn new(
        config: AppConfig,
        invoker: Arc<dyn CommandInvoker>,
        picker: Arc<dyn DirectoryPicker>,
        watcher: Arc<dyn FileWatcher>,
        tokio_handle: tokio::runtime::Handle,
    ) -> Self {
        let bus = EventBus::new(config.events.channel_capacity);
        let bridge = RequestBridge::new(Arc::clone(&invoker), config.bridge.command_prefix.clone());
        let relay = FileWatchRelay::new(watcher, bus.clone(), config.watch.recursive);
        let flow = Arc::new(ConfirmConfigureFlow::new(
            config.local_chart.clone(),
            Arc::clone(&invoker),
            picker,
            relay,
            bridge.clone(),
        ));

        Self {
            config,
            invoker,
            bus,
            bridge,
            flow,
            tokio_handle,
        }
    }

    /// Run the startup sequence.
    ///
    /// Publishes [`AppEvent::LibrariesReady`] immediately and schedules the
    /// splash-dismiss command after the configured delay. A failed dismiss is
    /// logged, not fatal.
    ///
    /// # Returns
    /// Handle to the scheduled splash-dismiss task
    pub fn boot(&self) -> tokio::task::JoinHandle<()> {
        tracing::info!(
            "Request bridge installed for prefix {:?}",
            self.bridge.command_prefix()
        );

        let listeners = self.bus.publish(AppEvent::LibrariesReady);
        tracing::debug!("Libraries ready announced to {} listener(s)", listeners);

        let invoker = Arc::clone(&self.invoker);
        let command = self.config.startup.splash_command.clone();
        let delay = Duration::from_millis(self.config.startup.splash_delay_ms);

        self.tokio_handle.spawn(async move {
            tokio::time::sleep(delay).await;
            match invoker.invoke(&command, InvocationArgs::new()).await {
                Ok(_) => tracing::info!("Splash screen dismissed"),
                Err(e) => tracing::warn!("Failed to dismiss splash screen: {}", e),
            }
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bridge(&self) -> &RequestBridge {
        &self.bridge
    }

    pub fn flow(&self) -> &Arc<ConfirmConfigureFlow> {
        &self.flow
    }

    /// Route an outgoing request; see [`RequestBridge::intercept`]
    pub fn intercept(&self, request: RequestDescriptor) -> Route {
        self.bridge.intercept(request)
    }

    /// Forward a confirm event to the local chart flow
    pub async fn confirm(
        &self,
        trigger_id: &str,
        request: RequestDescriptor,
    ) -> Result<ConfirmOutcome, FlowError> {
        self.flow.confirm(trigger_id, request).await
    }

    /// Raise the stop signal; the active watch, if any, tears down
    pub fn request_stop_watch(&self) {
        tracing::info!("Stop of file watch requested");
        self.bus.publish(AppEvent::StopFileWatch);
    }
}
