//! Integration tests for the RequestBridge over an in-process CommandRegistry
//!
//! These tests verify that command-prefixed requests:
//! - Reach the named command with the decoded parameters
//! - Complete exactly once with the command's result as the body
//! - Fail with a completed error response instead of hanging

use helmad_bridge::models::{
    InvocationArgs, ReadyState, RequestDescriptor, STATUS_COMMAND_FAILED, STATUS_OK,
};
use helmad_bridge::services::CommandRegistry;
use helmad_bridge::ui::{RequestBridge, Route};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn backend(seen: Arc<Mutex<Vec<(String, InvocationArgs)>>>) -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    let home_seen = Arc::clone(&seen);
    registry.register("home", move |args| {
        let seen = Arc::clone(&home_seen);
        async move {
            seen.lock().unwrap().push(("home".to_string(), args));
            Ok::<Value, String>(json!("<h1>Charts</h1>"))
        }
    });

    registry.register("chart_versions", move |args: InvocationArgs| {
        let seen = Arc::clone(&seen);
        async move {
            seen.lock().unwrap().push(("chart_versions".to_string(), args));
            Ok::<Value, String>(json!(["1.0.0", "1.1.0"]))
        }
    });

    registry.register("broken", |_args| async move {
        Err::<Value, String>("helm not found".to_string())
    });

    registry
}

fn command(bridge: &RequestBridge, request: RequestDescriptor) -> helmad_bridge::ui::CommandRequest {
    match bridge.intercept(request) {
        Route::Command(request) => request,
        Route::Passthrough(request) => panic!("{} was not routed", request.target_path),
    }
}

#[tokio::test]
async fn test_command_request_completes_once() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let bridge = RequestBridge::new(Arc::new(backend(seen.clone())), "command:");

    let mut request = command(&bridge, RequestDescriptor::new("command:home"));
    assert_eq!(request.response().ready_state, ReadyState::Opened);

    let completions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completions);
    request.on_complete(move |response| {
        assert!(response.is_done());
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let response = request.send("").await;

    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(response.ready_state, ReadyState::Done);
    assert_eq!(response.status, STATUS_OK);
    assert_eq!(response.status_text, "OK");
    assert_eq!(response.body, "<h1>Charts</h1>");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "home");
    assert!(seen[0].1.is_empty());
}

#[tokio::test]
async fn test_blob_is_decoded_into_arguments() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let bridge = RequestBridge::new(Arc::new(backend(seen.clone())), "command:");

    let request = command(&bridge, RequestDescriptor::new("command:chart_versions"));
    let response = request.send("repo=bitnami&chart=nginx&chart=redis").await;

    // Non-string results are serialized as JSON
    assert_eq!(response.body, r#"["1.0.0","1.1.0"]"#);

    let seen = seen.lock().unwrap();
    let args = &seen[0].1;
    assert_eq!(args.get("repo").map(String::as_str), Some("bitnami"));
    // Duplicate keys keep the last value
    assert_eq!(args.get("chart").map(String::as_str), Some("redis"));
}

#[tokio::test]
async fn test_send_parameters_uses_descriptor_parameters() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let bridge = RequestBridge::new(Arc::new(backend(seen.clone())), "command:");

    let request = command(
        &bridge,
        RequestDescriptor::new("command:home")
            .with_parameter("values", "replicaCount: 2\nimage: a&b")
            .with_parameter("local", "true"),
    );
    request.send_parameters().await;

    let seen = seen.lock().unwrap();
    let args = &seen[0].1;
    assert_eq!(
        args.get("values").map(String::as_str),
        Some("replicaCount: 2\nimage: a&b")
    );
    assert_eq!(args.get("local").map(String::as_str), Some("true"));
}

#[tokio::test]
async fn test_failed_command_still_completes() {
    let bridge = RequestBridge::new(Arc::new(backend(Arc::default())), "command:");

    let mut request = command(&bridge, RequestDescriptor::new("command:broken"));
    let completions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&completions);
    request.on_complete(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let response = request.send("").await;

    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert!(response.is_done());
    assert!(!response.is_success());
    assert_eq!(response.status, STATUS_COMMAND_FAILED);
    assert!(response.body.contains("helm not found"));
}

#[tokio::test]
async fn test_unknown_command_fails_with_name() {
    let bridge = RequestBridge::new(Arc::new(backend(Arc::default())), "command:");

    let response = command(&bridge, RequestDescriptor::new("command:missing"))
        .send("")
        .await;

    assert_eq!(response.status, STATUS_COMMAND_FAILED);
    assert!(response.body.contains("missing"));
}

#[test]
fn test_plain_requests_pass_through_untouched() {
    let bridge = RequestBridge::new(Arc::new(backend(Arc::default())), "command:");
    let request = RequestDescriptor::new("assets/app.js").with_parameter("v", "3");

    match bridge.intercept(request.clone()) {
        Route::Passthrough(passed) => assert_eq!(passed, request),
        Route::Command(_) => panic!("plain request was routed to a command"),
    }
}

#[test]
fn test_blocking_send_from_sync_code() {
    let bridge = RequestBridge::new(Arc::new(backend(Arc::default())), "command:");
    let request = command(&bridge, RequestDescriptor::new("command:home"));

    let response = tokio_test::block_on(request.send(""));

    assert_eq!(response.body, "<h1>Charts</h1>");
}
