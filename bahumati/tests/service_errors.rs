//! Integration tests for network failure surfaces.
//!
//! Every service call against an unreachable backend must come back as a
//! `Transport` error with a sanitized user message, never a panic and never
//! a half-parsed payload.

use bahumati::client::{ApiClient, ServiceError};
use bahumati::services::Services;
use bahumati::session::{Credentials, MemoryStore, SessionError, SessionManager};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

fn dead_services() -> Services {
    // Nothing listens on this port.
    Services::new(ApiClient::new("http://127.0.0.1:19999".to_string()).with_token("tok".into()))
}

#[tokio::test]
async fn list_calls_surface_transport_errors() {
    let svc = dead_services();

    let events = svc.events.list().await;
    assert!(matches!(events, Err(ServiceError::Transport(_))));

    let withdrawals = svc.withdrawals.list(None).await;
    assert!(matches!(withdrawals, Err(ServiceError::Transport(_))));

    let agents = svc.agents.list().await;
    assert!(matches!(agents, Err(ServiceError::Transport(_))));
}

#[tokio::test]
async fn transport_errors_are_sanitized_for_display() {
    let svc = dead_services();
    let err = svc.transactions.list().await.unwrap_err();
    assert_eq!(err.user_message(), "Network error, backend unreachable");
}

#[tokio::test]
async fn mutations_surface_transport_errors() {
    let svc = dead_services();

    let approve = svc.withdrawals.approve("w1").await;
    assert!(matches!(approve, Err(ServiceError::Transport(_))));

    let otp = svc.users.send_otp("9876543210").await;
    assert!(matches!(otp, Err(ServiceError::Transport(_))));
}

#[tokio::test]
async fn login_against_unreachable_backend_fails_cleanly() {
    let manager = SessionManager::new(
        "http://127.0.0.1:19999".to_string(),
        Arc::new(MemoryStore::new()),
    );

    let result = timeout(
        Duration::from_secs(30),
        manager.login(Credentials {
            username: "ananya".to_string(),
            password: "secret".to_string(),
        }),
    )
    .await
    .expect("connection refusal is immediate");

    assert!(matches!(result, Err(SessionError::Service(_))));
    assert!(manager.current_operator().is_none());
}
