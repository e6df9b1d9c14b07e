//! Session mode end to end: cookie login, profile, logout.

use gatekeeper::config::AuthMode;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::StatusCode;
use serde_json::Value;

mod common;

fn session_cookie(resp: &reqwest::Response) -> String {
    let header = resp.headers()[SET_COOKIE].to_str().unwrap();
    header.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_cookie_login_profile_logout() {
    let (addr, shutdown) = common::start_gateway(common::test_config(AuthMode::Session)).await;
    let client = common::client();

    common::signup(&client, addr, "s1@example.com", "pw").await;
    let resp = common::login(&client, addr, "s1@example.com", "pw").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.contains("Max-Age=900"));
    let cookie = session_cookie(&resp);
    assert!(cookie.starts_with("ssid="));

    let resp = client
        .get(format!("http://{addr}/user/profile"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["email"], "s1@example.com");

    let resp = client
        .post(format!("http://{addr}/user/logout"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("http://{addr}/user/profile"))
        .header(COOKIE, &cookie)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unknown_session_rejected() {
    let (addr, shutdown) = common::start_gateway(common::test_config(AuthMode::Session)).await;
    let client = common::client();
    let url = format!("http://{addr}/user/profile");

    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client.get(&url).header(COOKIE, "ssid=forged").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Bearer tokens mean nothing in session mode.
    let resp = client.get(&url).bearer_auth("anything").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    shutdown.trigger();
}
