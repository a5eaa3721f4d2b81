// UI module - Page-side glue between the request layer and the native backend
//
// This module contains:
// - RequestBridge: Routes command-prefixed requests to the command invoker
// - EventBus: Typed page-wide publish/subscribe
// - ConfirmConfigureFlow: Directory pick -> watch -> configured request
// - PageController: Wires the above together and runs the startup sequence

pub mod bridge;
pub mod controller;
pub mod events;
pub mod flow;

pub use bridge::{CommandRequest, CompletionListener, RequestBridge, Route};
pub use controller::PageController;
pub use events::EventBus;
pub use flow::{ConfirmConfigureFlow, ConfirmOutcome, FlowError};
