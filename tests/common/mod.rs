#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;

use shop_api_rust::auth::{generate_jwt, Claims, TokenAuthenticator};
use shop_api_rust::config::SecurityConfig;
use shop_api_rust::database::Store;
use shop_api_rust::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

pub fn security() -> SecurityConfig {
    SecurityConfig {
        enable_cors: false,
        cors_origins: vec![],
        jwt_secret: TEST_SECRET.to_string(),
        jwt_issuer: None,
        jwt_audience: None,
        jwt_expiry_hours: 1,
    }
}

impl TestServer {
    /// Serves a fresh in-memory app on an unused port for the lifetime of the
    /// calling test's runtime.
    async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let authenticator = TokenAuthenticator::new(&security())?;
        let app = shop_api_rust::app(AppState::new(Store::in_memory(), authenticator, None));
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Ok(Self { port, base_url, client: reqwest::Client::new() })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = self.client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }
}

pub async fn ensure_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Signed token for `subject` holding `roles`.
pub fn token(subject: &str, roles: &[&str]) -> String {
    let claims = Claims::new(subject, roles.iter().map(|r| r.to_string()).collect(), &security());
    generate_jwt(&claims, TEST_SECRET).expect("failed to sign test token")
}

pub fn admin_token() -> String {
    token("admin-user", &["admin"])
}

pub fn user_token(subject: &str) -> String {
    token(subject, &["user"])
}

/// Sends the request, asserts the status and returns the `data` member.
pub async fn expect_data(request: RequestBuilder, status: StatusCode) -> Result<Value> {
    let res = request.send().await?;
    let actual = res.status();
    let body = res.text().await?;
    assert_eq!(actual, status, "unexpected status {}: {}", actual, body);
    let payload: Value = serde_json::from_str(&body)?;
    assert_eq!(payload["success"], Value::Bool(true), "success flag missing: {}", payload);
    Ok(payload["data"].clone())
}

pub async fn expect_status(request: RequestBuilder, status: StatusCode) -> Result<()> {
    let res = request.send().await?;
    let actual = res.status();
    let body = res.text().await?;
    assert_eq!(actual, status, "unexpected status {}: {}", actual, body);
    Ok(())
}
