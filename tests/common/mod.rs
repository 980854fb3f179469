#![allow(dead_code)]

use anyhow::{Context, Result};
use tempfile::TempDir;

use shortcuts_api::server::{app, AppState};

/// An in-process server bound to an ephemeral port, with its own isolated
/// data directory. Dropped state (and the temp dir) goes away with the test.
pub struct TestServer {
    pub base_url: String,
    _data_dir: TempDir,
}

pub async fn spawn_server() -> Result<TestServer> {
    let data_dir = tempfile::tempdir().context("failed to create temp data dir")?;

    let state = AppState::new(data_dir.path())?;
    state.users.seed_defaults().await?;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.expect("test server");
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        _data_dir: data_dir,
    })
}

/// Log in and return the bearer token.
pub async fn login(base_url: &str, username: &str, password: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await?;

    anyhow::ensure!(res.status().is_success(), "login failed: {}", res.status());

    let body = res.json::<serde_json::Value>().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("token missing from login response")
}

/// Token for the seeded admin account (dev defaults).
pub async fn admin_token(base_url: &str) -> Result<String> {
    login(base_url, "renshu", "renshu123").await
}

/// Token for the seeded demo account (dev defaults).
pub async fn demo_token(base_url: &str) -> Result<String> {
    login(base_url, "gabby_demo", "gabby123").await
}

/// Register a fresh client-role user and return its token.
pub async fn client_token(base_url: &str, username: &str) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/auth/register", base_url))
        .json(&serde_json::json!({ "username": username, "password": "client-pw" }))
        .send()
        .await?;

    anyhow::ensure!(
        res.status() == reqwest::StatusCode::CREATED,
        "register failed: {}",
        res.status()
    );

    let body = res.json::<serde_json::Value>().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("token missing from register response")
}
