#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "chef@bistro.test";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Memory backend with a known secret and one bootstrapped admin
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_bistro-gateway"));
        cmd.env("BISTRO_PORT", port.to_string())
            .env("BIND_HOST", "127.0.0.1")
            .env("APP_ENV", "development")
            .env("STORE_BACKEND", "memory")
            .env("ACCESS_SECRET_TOKEN", SECRET)
            .env("BISTRO_BOOTSTRAP_ADMIN", ADMIN_EMAIL)
            .env_remove("DATABASE_URL")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Start a gateway for one test. It is killed when the handle is dropped.
pub async fn ensure_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Obtain a bearer token for `email` through POST /jwt.
pub async fn token_for(server: &TestServer, email: &str) -> Result<String> {
    let body: Value = reqwest::Client::new()
        .post(server.url("/jwt"))
        .json(&json!({ "email": email }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    body["token"]
        .as_str()
        .map(str::to_string)
        .context("token missing from /jwt response")
}

/// Unique email so tests sharing one server do not collide.
pub fn unique_email(prefix: &str) -> String {
    format!("{}-{}@bistro.test", prefix, uuid::Uuid::new_v4().simple())
}
