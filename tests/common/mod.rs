//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use gatekeeper::config::{AuthMode, GatewayConfig};
use gatekeeper::http::HttpServer;
use gatekeeper::lifecycle::Shutdown;
use reqwest::{Client, Response};
use serde_json::json;

pub const USER_AGENT: &str = "gatekeeper-tests/1.0";

/// A config with cheap hashing and the given auth mode.
pub fn test_config(mode: AuthMode) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.auth.mode = mode;
    config.token.signing_key = "integration-signing-key".into();
    config.users.bcrypt_cost = 4;
    config
}

/// Start a gateway on an ephemeral port. Dropping the returned handle
/// does not stop it; call `trigger` on the shutdown.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).await.unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown)
}

pub fn client() -> Client {
    Client::builder().user_agent(USER_AGENT).build().unwrap()
}

#[allow(dead_code)]
pub async fn signup(client: &Client, addr: SocketAddr, email: &str, password: &str) -> Response {
    client
        .post(format!("http://{addr}/user/signup"))
        .json(&json!({ "email": email, "password": password, "confirmPassword": password }))
        .send()
        .await
        .unwrap()
}

#[allow(dead_code)]
pub async fn login(client: &Client, addr: SocketAddr, email: &str, password: &str) -> Response {
    client
        .post(format!("http://{addr}/user/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .unwrap()
}
