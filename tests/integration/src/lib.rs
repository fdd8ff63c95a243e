//! Integration tests for the Vigil server.
//!
//! These tests start the `vigil-server` binary and talk to it over HTTP.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::process::{Child, Command, Stdio};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ValidateResponse {
    pub secure: bool,
}

// ============================================================================
// Test Server
// ============================================================================

/// A running `vigil-server` process, killed on drop.
pub struct TestServer {
    process: Child,
    pub base_url: String,
    pub port: u16,
}

impl TestServer {
    /// Start a server with the default policy on the specified port.
    pub async fn start(port: u16) -> Result<Self> {
        Self::start_with_args(port, &[]).await
    }

    /// Start a server on `port`, passing extra command line flags.
    pub async fn start_with_args(port: u16, args: &[&str]) -> Result<Self> {
        let server_binary = find_server_binary()?;

        let process = Command::new(&server_binary)
            .arg("--bind")
            .arg(format!("127.0.0.1:{}", port))
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start server: {:?}", server_binary))?;

        let server = Self {
            process,
            base_url: format!("http://127.0.0.1:{}", port),
            port,
        };

        server.wait_for_ready().await?;

        Ok(server)
    }

    /// Wait for the server to be ready to accept connections.
    async fn wait_for_ready(&self) -> Result<()> {
        let client = Client::new();
        let url = format!("{}/v1/sys/health", self.base_url);

        for _ in 0..50 {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }

        bail!("Server failed to start within 5 seconds")
    }

    /// Get an HTTP client for this server.
    pub fn client(&self) -> VigilClient {
        VigilClient::new(&self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// Find the server binary in the target directory.
fn find_server_binary() -> Result<std::path::PathBuf> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());

    // Try debug build first, then release
    let candidates = [
        std::path::Path::new(&manifest_dir).join("../../target/debug/vigil-server"),
        std::path::Path::new(&manifest_dir).join("../../target/debug/vigil-server.exe"),
        std::path::Path::new(&manifest_dir).join("../../target/release/vigil-server"),
        std::path::Path::new(&manifest_dir).join("../../target/release/vigil-server.exe"),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            return Ok(candidate.canonicalize()?);
        }
    }

    bail!(
        "Could not find vigil-server binary. Run 'cargo build -p vigil-server' first. Searched in: {:?}",
        candidates
    )
}

// ============================================================================
// Test Client
// ============================================================================

/// HTTP client for testing the Vigil API.
pub struct VigilClient {
    client: Client,
    base_url: String,
}

impl VigilClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self.client.get(self.url("/v1/sys/health")).send().await?;
        Ok(resp.json().await?)
    }

    pub async fn validate(&self, password: &str) -> Result<ValidateResponse> {
        let resp = self
            .client
            .post(self.url("/validate"))
            .json(&ValidateRequest { password })
            .send()
            .await?;
        if !resp.status().is_success() {
            bail!("Validate failed: {}", resp.text().await?);
        }
        Ok(resp.json().await?)
    }

    /// Posts an arbitrary JSON body and returns the raw status and body.
    pub async fn validate_raw(&self, body: &Value) -> Result<(StatusCode, Value)> {
        let resp = self
            .client
            .post(self.url("/validate"))
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        Ok((status, resp.json().await?))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU16, Ordering};

    // Port counter to avoid conflicts between parallel tests
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18200);

    fn next_port() -> u16 {
        PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
    }

    #[tokio::test]
    async fn test_server_health() {
        let server = TestServer::start(next_port()).await.unwrap();
        let health = server.client().health().await.unwrap();

        assert_eq!(health.status, "ok");
        assert!(!health.version.is_empty());
    }

    #[tokio::test]
    async fn test_validate_reference_passwords() {
        let server = TestServer::start(next_port()).await.unwrap();
        let client = server.client();

        let cases = [
            ("Admin123!", true),
            ("weakpass", false),
            ("PASSWORD", false),
            ("P@ss", false),
            ("Strong@123", true),
        ];

        for (password, expected) in cases {
            let result = client.validate(password).await.unwrap();
            assert_eq!(result.secure, expected, "{}", password);
        }
    }

    #[tokio::test]
    async fn test_validate_missing_password() {
        let server = TestServer::start(next_port()).await.unwrap();

        let (status, body) = server.client().validate_raw(&json!({})).await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "secure": false }));
    }

    #[tokio::test]
    async fn test_validate_rejects_non_string_password() {
        let server = TestServer::start(next_port()).await.unwrap();

        let (status, body) = server
            .client()
            .validate_raw(&json!({ "password": 12345678 }))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_policy_flags() {
        let server = TestServer::start_with_args(next_port(), &["--min-length", "12"])
            .await
            .unwrap();
        let client = server.client();

        assert!(!client.validate("Admin123!").await.unwrap().secure);
        assert!(client.validate("Admin123!Admin").await.unwrap().secure);
    }
}
