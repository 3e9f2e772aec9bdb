use std::time::Duration;

use anyhow::Context;
use clap::Subcommand;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum RemoteCommands {
    #[command(about = "Check gateway and store health via /health")]
    Health,

    #[command(about = "Ask the gateway whether the token holder is an admin")]
    AdminCheck {
        #[arg(long, help = "Email in the token")]
        email: String,

        #[arg(long, env = "BISTRO_TOKEN", hide_env_values = true)]
        token: String,
    },
}

pub async fn handle(base_url: &str, cmd: RemoteCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let base_url = base_url.trim_end_matches('/');

    let request = match &cmd {
        RemoteCommands::Health => client.get(format!("{}/health", base_url)),
        RemoteCommands::AdminCheck { email, token } => client
            .get(format!("{}/users/admin/{}", base_url, email))
            .bearer_auth(token),
    };

    let response = request
        .send()
        .await
        .with_context(|| format!("failed to reach {}", base_url))?;
    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status != StatusCode::OK {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed"));
        let code = body.get("code").and_then(Value::as_str);
        output_error(&output_format, &format!("{} ({})", message, status.as_u16()), code)?;
        anyhow::bail!("gateway returned {}", status);
    }

    match cmd {
        RemoteCommands::Health => output_success(&output_format, &format!("{} is healthy", base_url), Some(body)),
        RemoteCommands::AdminCheck { email, .. } => {
            let admin = body.get("admin").and_then(Value::as_bool).unwrap_or(false);
            output_success(
                &output_format,
                &format!("{} {} an admin", email, if admin { "is" } else { "is not" }),
                Some(json!({ "email": email, "admin": admin })),
            )
        }
    }
}
