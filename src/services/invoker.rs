use crate::models::InvocationArgs;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by a command invoker
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Command {command} failed: {message}")]
    Failed { command: String, message: String },
}

/// Async call-by-name channel to the native backend.
///
/// Implementations execute the named backend operation with the given
/// arguments and resolve to its JSON result.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandInvoker: Send + Sync {
    async fn invoke(&self, command: &str, args: InvocationArgs) -> Result<Value, InvokeError>;
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, String>> + Send>>;
type Handler = Arc<dyn Fn(InvocationArgs) -> HandlerFuture + Send + Sync>;

/// In-process command invoker backed by a table of async handlers.
///
/// Used by the binary to stand in for the native backend and by tests.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Handler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`, replacing any previous one
    pub fn register<F, Fut>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(InvocationArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, String>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |args| -> HandlerFuture { Box::pin(handler(args)) });
        self.handlers.insert(name.into(), handler);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered command names, sorted
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.commands())
            .finish()
    }
}

#[async_trait]
impl CommandInvoker for CommandRegistry {
    async fn invoke(&self, command: &str, args: InvocationArgs) -> Result<Value, InvokeError> {
        let handler = self
            .handlers
            .get(command)
            .cloned()
            .ok_or_else(|| InvokeError::UnknownCommand(command.to_string()))?;

        tracing::debug!("Invoking {} with {} argument(s)", command, args.len());

        handler(args).await.map_err(|message| InvokeError::Failed {
            command: command.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> CommandRegistry {
        let mut registry = CommandRegistry::new();
        registry
            .register("echo_path", |args: InvocationArgs| async move {
                Ok::<Value, String>(json!(args.get("path").cloned().unwrap_or_default()))
            })
            .register("broken", |_args| async move {
                Err::<Value, String>("helm exited with 1".to_string())
            });
        registry
    }

    #[tokio::test]
    async fn test_invoke_registered_command() {
        let mut args = InvocationArgs::new();
        args.insert("path".to_string(), "/charts/app".to_string());

        let result = registry().invoke("echo_path", args).await.unwrap();
        assert_eq!(result, json!("/charts/app"));
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let err = registry()
            .invoke("missing", InvocationArgs::new())
            .await
            .unwrap_err();
        assert_eq!(err, InvokeError::UnknownCommand("missing".to_string()));
    }

    #[tokio::test]
    async fn test_handler_failure_is_wrapped() {
        let err = registry()
            .invoke("broken", InvocationArgs::new())
            .await
            .unwrap_err();

        assert!(matches!(err, InvokeError::Failed { ref command, .. } if command == "broken"));
        assert!(err.to_string().contains("helm exited with 1"));
    }

    #[test]
    fn test_commands_sorted() {
        assert_eq!(registry().commands(), vec!["broken", "echo_path"]);
    }
}
