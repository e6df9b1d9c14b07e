//! Admission control over a real socket.

use std::time::Duration;

use gatekeeper::config::AuthMode;
use reqwest::StatusCode;

mod common;

#[tokio::test]
async fn test_budget_exhaustion_returns_429() {
    let mut config = common::test_config(AuthMode::Token);
    config.rate_limit.max_requests = 5;
    config.rate_limit.window_ms = 60_000;
    let (addr, shutdown) = common::start_gateway(config).await;
    let client = common::client();

    // Allowlisted path so only admission decides.
    let url = format!("http://{addr}/user/login");
    for i in 0..5 {
        let resp = client.post(&url).json(&serde_json::json!({})).send().await.unwrap();
        assert_ne!(resp.status(), StatusCode::TOO_MANY_REQUESTS, "request {i} was limited");
    }

    let resp = client.post(&url).json(&serde_json::json!({})).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.bytes().await.unwrap().is_empty());

    shutdown.trigger();
}

#[tokio::test]
async fn test_load_test_marker_bypasses_budget() {
    let mut config = common::test_config(AuthMode::Token);
    config.rate_limit.max_requests = 1;
    config.rate_limit.window_ms = 60_000;
    let (addr, shutdown) = common::start_gateway(config).await;
    let client = common::client();
    let url = format!("http://{addr}/user/profile");

    // Spend the only slot.
    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    // Marked traffic still reaches the authenticator.
    for _ in 0..10 {
        let resp = client.get(&url).header("x-stress", "true").send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    // Any other value counts as unmarked.
    let resp = client.get(&url).header("x-stress", "TRUE").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    shutdown.trigger();
}

#[tokio::test]
async fn test_window_slides() {
    let mut config = common::test_config(AuthMode::Token);
    config.rate_limit.max_requests = 2;
    config.rate_limit.window_ms = 300;
    let (addr, shutdown) = common::start_gateway(config).await;
    let client = common::client();
    let url = format!("http://{addr}/user/profile");

    for _ in 0..2 {
        client.get(&url).send().await.unwrap();
    }
    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    tokio::time::sleep(Duration::from_millis(400)).await;
    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    shutdown.trigger();
}

#[tokio::test]
async fn test_concurrent_clients_never_exceed_budget() {
    let mut config = common::test_config(AuthMode::Token);
    config.rate_limit.max_requests = 25;
    config.rate_limit.window_ms = 60_000;
    let (addr, shutdown) = common::start_gateway(config).await;
    let client = common::client();

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let client = client.clone();
        let url = format!("http://{addr}/user/profile");
        tasks.push(tokio::spawn(async move {
            let mut admitted = 0;
            for _ in 0..10 {
                let resp = client.get(&url).send().await.unwrap();
                if resp.status() != StatusCode::TOO_MANY_REQUESTS {
                    admitted += 1;
                }
            }
            admitted
        }));
    }

    let mut admitted = 0;
    for task in tasks {
        admitted += task.await.unwrap();
    }
    assert_eq!(admitted, 25);

    shutdown.trigger();
}
