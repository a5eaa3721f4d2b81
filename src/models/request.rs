use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Argument mapping handed to the command invoker.
///
/// Keys are unique. Order is kept for logging only; invokers must not rely on it.
pub type InvocationArgs = IndexMap<String, String>;

/// HTTP status written on a successful command call
pub const STATUS_OK: u16 = 200;

/// HTTP status written when the command invoker rejects the call
pub const STATUS_COMMAND_FAILED: u16 = 500;

/// An outgoing request as seen by the page's request layer, just before send.
///
/// Created once per UI-triggered request and moved into the
/// [`RequestBridge`](crate::ui::RequestBridge), so it cannot be sent twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub target_path: String,
    pub parameters: IndexMap<String, String>,
}

impl RequestDescriptor {
    pub fn new(target_path: impl Into<String>) -> Self {
        Self {
            target_path: target_path.into(),
            parameters: IndexMap::new(),
        }
    }

    /// Builder-style parameter insertion. Re-inserting a key replaces its value.
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Mirror of the request-object ready states the page's request layer inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum ReadyState {
    Unsent = 0,
    Opened = 1,
    HeadersReceived = 2,
    Loading = 3,
    Done = 4,
}

/// Completed-request state fabricated from a command result.
///
/// Fields are plain and mutable from construction. The bridge owns this
/// value, so nothing read-only has to be overridden on a shared type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticResponse {
    pub ready_state: ReadyState,
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl SyntheticResponse {
    pub fn new() -> Self {
        Self {
            ready_state: ReadyState::Unsent,
            status: 0,
            status_text: String::new(),
            body: String::new(),
        }
    }

    /// Write the state of a successful call
    pub fn complete(&mut self, body: String) {
        self.body = body;
        self.ready_state = ReadyState::Done;
        self.status = STATUS_OK;
        self.status_text = "OK".to_string();
    }

    /// Write the state of a rejected call. The response still ends up `Done`.
    pub fn fail(&mut self, message: String) {
        self.body = message;
        self.ready_state = ReadyState::Done;
        self.status = STATUS_COMMAND_FAILED;
        self.status_text = "Command Failed".to_string();
    }

    pub fn is_done(&self) -> bool {
        self.ready_state == ReadyState::Done
    }

    pub fn is_success(&self) -> bool {
        self.is_done() && (200..300).contains(&self.status)
    }
}

impl Default for SyntheticResponse {
    fn default() -> Self {
        Self::new()
    }
}
