use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use serde_json::{json, Value};

use crate::auth::{ClaimSet, TokenCodec, TokenError, DEFAULT_TOKEN_TTL_HOURS, MAX_TOKEN_TTL_HOURS};
use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Sign a claim set into a bearer token")]
    Sign {
        #[arg(long, help = "Claim set as a JSON object, e.g. '{\"email\":\"chef@x.com\"}'")]
        claims: String,

        #[arg(long, env = "ACCESS_SECRET_TOKEN", hide_env_values = true)]
        secret: String,

        #[arg(
            long,
            env = "TOKEN_TTL_HOURS",
            default_value_t = DEFAULT_TOKEN_TTL_HOURS,
            value_parser = clap::value_parser!(i64).range(1..=MAX_TOKEN_TTL_HOURS)
        )]
        ttl_hours: i64,
    },

    #[command(about = "Verify a bearer token and print its claims")]
    Verify {
        #[arg(help = "Token to verify")]
        token: String,

        #[arg(long, env = "ACCESS_SECRET_TOKEN", hide_env_values = true)]
        secret: String,
    },
}

pub fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Sign { claims, secret, ttl_hours } => {
            let claims = parse_claims(&claims)?;
            let codec = TokenCodec::new(&secret, Duration::hours(ttl_hours))?;
            let token = codec.sign(&claims)?;

            output_success(
                &output_format,
                "Token signed",
                Some(json!({ "token": token, "ttl_hours": ttl_hours })),
            )
        }
        TokenCommands::Verify { token, secret } => {
            let codec = TokenCodec::with_default_ttl(&secret)?;

            match codec.verify(token.trim()) {
                Ok(claims) => output_success(&output_format, "Token is valid", Some(json!({ "claims": claims }))),
                Err(TokenError::Expired { expired_at }) => {
                    let when = Utc
                        .timestamp_opt(expired_at, 0)
                        .single()
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| expired_at.to_string());
                    output_error(&output_format, &format!("Token expired at {}", when), Some("EXPIRED"))?;
                    anyhow::bail!("token rejected")
                }
                Err(e) => {
                    output_error(&output_format, &e.to_string(), Some("INVALID_SIGNATURE"))?;
                    anyhow::bail!("token rejected")
                }
            }
        }
    }
}

fn parse_claims(raw: &str) -> anyhow::Result<ClaimSet> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(claims) => Ok(claims),
        _ => anyhow::bail!("--claims must be a JSON object"),
    }
}
