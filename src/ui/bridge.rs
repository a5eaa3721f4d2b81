// RequestBridge - Routes command-prefixed page requests to the command invoker
//
// The page's request layer expects ordinary network-response semantics. For
// requests whose path carries the command prefix, the bridge:
// 1. Decodes the outgoing parameter blob into invocation arguments
// 2. Invokes the command named by the rest of the path
// 3. Writes the result into a SyntheticResponse and fires one completion signal
//
// A rejected invocation still completes the response, with a failure status,
// so nothing on the page is left pending.

use crate::models::{ReadyState, RequestDescriptor, SyntheticResponse};
use crate::services::codec;
use crate::services::invoker::CommandInvoker;
use serde_json::Value;
use std::sync::Arc;

/// Listener fired once when a command request completes
pub type CompletionListener = Box<dyn FnOnce(&SyntheticResponse) + Send>;

/// Where an intercepted request goes
pub enum Route {
    /// Command-bound; send through [`CommandRequest::send`]
    Command(CommandRequest),

    /// Network-bound; left untouched
    Passthrough(RequestDescriptor),
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Command(request) => f.debug_tuple("Command").field(&request.command).finish(),
            Route::Passthrough(request) => f.debug_tuple("Passthrough").field(request).finish(),
        }
    }
}

/// Intercepts requests before send and reroutes command-prefixed ones
///
/// # Example
/// ```ignore
/// let bridge = RequestBridge::new(invoker, "command:");
/// match bridge.intercept(RequestDescriptor::new("command:home")) {
///     Route::Command(request) => {
///         let response = request.send("").await;
///         assert!(response.is_done());
///     }
///     Route::Passthrough(request) => send_over_network(request),
/// }
/// ```
#[derive(Clone)]
pub struct RequestBridge {
    invoker: Arc<dyn CommandInvoker>,
    command_prefix: String,
}

impl RequestBridge {
    pub fn new(invoker: Arc<dyn CommandInvoker>, command_prefix: impl Into<String>) -> Self {
        Self {
            invoker,
            command_prefix: command_prefix.into(),
        }
    }

    pub fn command_prefix(&self) -> &str {
        &self.command_prefix
    }

    /// Command name for a command-prefixed path, `None` otherwise
    pub fn command_name<'a>(&self, target_path: &'a str) -> Option<&'a str> {
        target_path.strip_prefix(self.command_prefix.as_str())
    }

    /// Route a request that is about to be sent
    pub fn intercept(&self, request: RequestDescriptor) -> Route {
        let Some(command) = self.command_name(&request.target_path) else {
            return Route::Passthrough(request);
        };

        tracing::debug!("Routing {} to command {}", request.target_path, command);

        let mut response = SyntheticResponse::new();
        response.ready_state = ReadyState::Opened;

        Route::Command(CommandRequest {
            command: command.to_string(),
            descriptor: request,
            invoker: Arc::clone(&self.invoker),
            response,
            listeners: Vec::new(),
        })
    }
}

/// A command-bound request, ready to send once
pub struct CommandRequest {
    command: String,
    descriptor: RequestDescriptor,
    invoker: Arc<dyn CommandInvoker>,
    response: SyntheticResponse,
    listeners: Vec<CompletionListener>,
}

impl CommandRequest {
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Response state before send
    pub fn response(&self) -> &SyntheticResponse {
        &self.response
    }

    /// Register a listener for the completion signal
    pub fn on_complete<F>(&mut self, listener: F)
    where
        F: FnOnce(&SyntheticResponse) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Send with the request's own parameters as the body
    pub async fn send_parameters(self) -> SyntheticResponse {
        let blob = codec::encode(&self.descriptor.parameters);
        self.send(&blob).await
    }

    /// Send with `blob` as the form-urlencoded body.
    ///
    /// Consumes the request. The returned response is always `Done`, and every
    /// registered listener has fired exactly once.
    pub async fn send(mut self, blob: &str) -> SyntheticResponse {
        let args = codec::decode(blob);
        tracing::info!("Calling command {} with {} argument(s)", self.command, args.len());
        tracing::debug!("Command {} parameters: {}", self.command, blob);

        match self.invoker.invoke(&self.command, args).await {
            Ok(value) => self.response.complete(response_body(value)),
            Err(e) => {
                tracing::error!("Command {} failed: {}", self.command, e);
                self.response.fail(e.to_string());
            }
        }

        for listener in self.listeners.drain(..) {
            listener(&self.response);
        }

        self.response
    }
}

/// JSON strings become the body verbatim; anything else is serialized
pub(crate) fn response_body(value: Value) -> String {
    match value {
        Value::String(body) => body,
        other => other.to_string(),
    }
}
