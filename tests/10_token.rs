mod common;

use anyhow::Result;
use bistro_gateway::auth::TokenCodec;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn banner_and_health_are_public() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(server.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "bistro boss is running!");

    let health: Value = client.get(server.url("/health")).send().await?.json().await?;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["store"], "memory");
    Ok(())
}

#[tokio::test]
async fn issued_token_verifies_with_the_server_secret() -> Result<()> {
    let server = common::ensure_server().await?;
    let token = common::token_for(&server, "diner@bistro.test").await?;

    let codec = TokenCodec::with_default_ttl(common::SECRET)?;
    let claims = codec.verify(&token)?;
    assert_eq!(claims["email"], "diner@bistro.test");

    let foreign = TokenCodec::with_default_ttl("some-other-secret")?;
    assert!(foreign.verify(&token).is_err());
    Ok(())
}

#[tokio::test]
async fn issuance_rejects_bad_claim_sets() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.post(server.url("/jwt")).json(&json!("just a string")).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "BAD_REQUEST");

    let res = client
        .post(server.url("/jwt"))
        .json(&json!({ "email": "a@bistro.test", "iat": 0 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_unauthorized() -> Result<()> {
    let server = common::ensure_server().await?;
    let codec = TokenCodec::with_default_ttl(common::SECRET)?;
    let claims = json!({ "email": common::ADMIN_EMAIL });
    let stale = codec.sign_at(claims.as_object().unwrap(), Utc::now() - Duration::hours(4) - Duration::minutes(1))?;

    let res = reqwest::Client::new()
        .get(server.url("/users"))
        .bearer_auth(stale)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "invalid or expired credentials");
    Ok(())
}

#[tokio::test]
async fn server_stops_when_handle_is_dropped() -> Result<()> {
    let server = common::ensure_server().await?;
    let health = server.url("/health");
    drop(server);

    let res = reqwest::Client::new()
        .get(health)
        .timeout(std::time::Duration::from_secs(2))
        .send()
        .await;
    assert!(res.is_err(), "gateway still answering after drop");
    Ok(())
}
