// Confirm/Configure flow - "pick a chart directory, then render it"
//
// For the designated trigger element the flow:
// 1. Suppresses the default request issuance and opens the directory picker
// 2. Arms the file watch on the picked directory
// 3. Pre-renders the chart and injects the result into the request parameters
// 4. Re-issues the request through the RequestBridge
//
// The pick always settles before the configure step starts. One cycle runs
// at a time; the picked directory lives in that cycle's FlowState.

use crate::models::{InvocationArgs, LocalChartSettings, RequestDescriptor, SyntheticResponse};
use crate::services::invoker::{CommandInvoker, InvokeError};
use crate::services::picker::DirectoryPicker;
use crate::services::watch::{FileWatchRelay, WatchError, WatchSubscription};
use crate::state::{FlowPhase, FlowState, InvalidTransition};
use crate::ui::bridge::{RequestBridge, Route, response_body};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that abort a flow cycle
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("A local chart flow is already in progress")]
    Busy,

    #[error("Failed to watch chart directory: {0}")]
    Watch(#[from] WatchError),

    #[error("Pre-render of {chart} failed: {source}")]
    PreRender {
        chart: Utf8PathBuf,
        #[source]
        source: InvokeError,
    },

    #[error("Render of {chart} failed: {source}")]
    Render {
        chart: Utf8PathBuf,
        #[source]
        source: InvokeError,
    },

    #[error(transparent)]
    Transition(#[from] InvalidTransition),
}

/// How a confirm event was handled
#[derive(Debug)]
pub enum ConfirmOutcome {
    /// Not the designated trigger; the default request proceeds unchanged
    NotHandled(RequestDescriptor),

    /// The picker was cancelled; nothing was invoked
    Cancelled { state: FlowState },

    /// The configured request was routed to its command and completed
    Sent {
        response: SyntheticResponse,
        state: FlowState,
    },

    /// The configured request is network-bound and handed back to the caller
    Passthrough {
        request: RequestDescriptor,
        state: FlowState,
    },
}

/// Clears the in-flight flag when a cycle ends, however it ends
struct CycleGuard<'a>(&'a AtomicBool);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Orchestrates directory selection, file watching and the deferred request
pub struct ConfirmConfigureFlow {
    settings: LocalChartSettings,
    invoker: Arc<dyn CommandInvoker>,
    picker: Arc<dyn DirectoryPicker>,
    relay: FileWatchRelay,
    bridge: RequestBridge,

    /// At most one watch is active; arming a new one stops the previous
    active_watch: Mutex<Option<Arc<WatchSubscription>>>,

    in_flight: AtomicBool,
}

impl ConfirmConfigureFlow {
    pub fn new(
        settings: LocalChartSettings,
        invoker: Arc<dyn CommandInvoker>,
        picker: Arc<dyn DirectoryPicker>,
        relay: FileWatchRelay,
        bridge: RequestBridge,
    ) -> Self {
        Self {
            settings,
            invoker,
            picker,
            relay,
            bridge,
            active_watch: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn settings(&self) -> &LocalChartSettings {
        &self.settings
    }

    /// Handle the request layer's confirm event for `trigger_id`.
    ///
    /// # Errors
    /// - [`FlowError::Busy`] if another cycle is running
    /// - [`FlowError::Watch`] if the picked directory cannot be watched
    /// - [`FlowError::PreRender`] if the pre-render command fails; the request is not sent
    pub async fn confirm(
        &self,
        trigger_id: &str,
        request: RequestDescriptor,
    ) -> Result<ConfirmOutcome, FlowError> {
        if trigger_id != self.settings.trigger_element {
            return Ok(ConfirmOutcome::NotHandled(request));
        }

        let _guard = self.begin_cycle()?;
        let mut state = FlowState::new();

        state.advance(FlowPhase::AwaitingPick)?;
        let picked = self.picker.pick_directory().await;
        state.settle_pick(picked)?;

        let Some(chart) = state.selected_path().map(Utf8Path::to_path_buf) else {
            tracing::info!("Chart directory selection cancelled, request dropped");
            return Ok(ConfirmOutcome::Cancelled { state });
        };

        self.arm_watch(&chart).await?;

        let request = self.configure(&chart, request).await?;
        state.advance(FlowPhase::RequestConfigured)?;

        let route = self.bridge.intercept(request);
        state.advance(FlowPhase::RequestSent)?;

        match route {
            Route::Command(command) => {
                let response = command.send_parameters().await;
                Ok(ConfirmOutcome::Sent { response, state })
            }
            Route::Passthrough(request) => {
                tracing::warn!(
                    "Configured request {} is not command-bound",
                    request.target_path
                );
                Ok(ConfirmOutcome::Passthrough { request, state })
            }
        }
    }

    /// Pick a chart directory, watch it and render it with the render command.
    ///
    /// # Returns
    /// The render result, or `None` if the picker was cancelled
    pub async fn render_local_chart(&self) -> Result<Option<Value>, FlowError> {
        let _guard = self.begin_cycle()?;

        let Some(chart) = self.picker.pick_directory().await else {
            tracing::info!("Chart directory selection cancelled, nothing rendered");
            return Ok(None);
        };

        self.arm_watch(&chart).await?;

        let mut args = InvocationArgs::new();
        args.insert("path".to_string(), chart.to_string());

        let rendered = self
            .invoker
            .invoke(&self.settings.render_command, args)
            .await
            .map_err(|source| FlowError::Render {
                chart: chart.clone(),
                source,
            })?;

        Ok(Some(rendered))
    }

    /// The currently active watch, if any
    pub fn active_watch(&self) -> Option<Arc<WatchSubscription>> {
        self.active_watch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Stop the active watch. Safe to call with no watch active.
    pub fn stop_watch(&self) -> bool {
        let active = self
            .active_watch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        active.is_some_and(|subscription| subscription.stop())
    }

    fn begin_cycle(&self) -> Result<CycleGuard<'_>, FlowError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| FlowError::Busy)?;
        Ok(CycleGuard(&self.in_flight))
    }

    async fn arm_watch(&self, chart: &Utf8Path) -> Result<(), WatchError> {
        let subscription = self.relay.start_watch(chart).await?;

        let previous = self
            .active_watch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(subscription);

        if let Some(previous) = previous {
            previous.stop();
        }
        Ok(())
    }

    /// Inject the fixed parameters and the pre-rendered resources
    async fn configure(
        &self,
        chart: &Utf8Path,
        mut request: RequestDescriptor,
    ) -> Result<RequestDescriptor, FlowError> {
        let name = self.settings.chart_name.clone();

        let mut args = InvocationArgs::new();
        args.insert("chart".to_string(), chart.to_string());
        args.insert("values".to_string(), String::new());
        args.insert("name".to_string(), name.clone());

        let resources = self
            .invoker
            .invoke(&self.settings.pre_render_command, args)
            .await
            .map_err(|source| {
                tracing::error!("Pre-render of {} failed, request aborted: {}", chart, source);
                FlowError::PreRender {
                    chart: chart.to_path_buf(),
                    source,
                }
            })?;

        let parameters = &mut request.parameters;
        parameters.insert("chart".to_string(), chart.to_string());
        parameters.insert("name".to_string(), name);
        parameters.insert("local".to_string(), "true".to_string());
        parameters.insert("values".to_string(), String::new());
        parameters.insert("resources".to_string(), response_body(resources));

        Ok(request)
    }
}
