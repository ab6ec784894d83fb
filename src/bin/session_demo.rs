//! Walks one session through its whole lifecycle against the in-memory stores,
//! without HTTP:
//!
//! $ cargo run --bin session_demo

use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use turnstile::application_impl::{JwtConfig, JwtHs256Signer, SessionManager};
use turnstile::application_port::{LoginInput, SessionService};
use turnstile::domain_model::Credential;
use turnstile::domain_port::{Clock, FixedClock};
use turnstile::infra_memory::{MemoryCredentialStore, MemoryRefreshStore, MemoryRevocationLedger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::new("session_demo=debug,turnstile=debug");

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // region initialization

    let credential_store = Arc::new(MemoryCredentialStore::from_credentials([Credential {
        username: "alice".to_string(),
        password: "secret".to_string(),
    }])?);
    let signer = Arc::new(JwtHs256Signer::new(JwtConfig {
        issuer: "turnstile".to_string(),
        audience: "records".to_string(),
        access_ttl: Duration::from_secs(60 * 60),
        key_id: None,
        signing_key: b"session-demo-key".to_vec(),
    }));
    let sessions = SessionManager::new(
        credential_store,
        signer,
        Arc::new(MemoryRevocationLedger::new()),
        Arc::new(MemoryRefreshStore::new()),
        Duration::from_secs(7 * 24 * 60 * 60),
    );
    let clock = FixedClock::new(chrono::Utc::now());

    // endregion

    let wrong = sessions
        .login(
            LoginInput {
                username: "alice".to_string(),
                password: "nope".to_string(),
            },
            clock.now(),
        )
        .await;
    println!("login with wrong password -> {:?}", wrong.err());

    let pair = sessions
        .login(
            LoginInput {
                username: "alice".to_string(),
                password: "secret".to_string(),
            },
            clock.now(),
        )
        .await?;
    println!("login -> access expires {}", pair.access_token_expires_at);
    println!(
        "access valid -> {}",
        sessions.is_valid(&pair.access_token.0, clock.now()).await
    );

    clock.advance(ChronoDuration::minutes(30));
    let rotated = sessions.refresh(&pair.refresh_token.0, clock.now()).await?;
    println!("refresh -> new pair issued");
    let replay = sessions.refresh(&pair.refresh_token.0, clock.now()).await;
    println!("replay old refresh token -> {:?}", replay.err());

    sessions.logout(&rotated.access_token.0, clock.now()).await;
    println!(
        "after logout, access valid -> {}",
        sessions.is_valid(&rotated.access_token.0, clock.now()).await
    );
    println!(
        "older access token still valid -> {}",
        sessions.is_valid(&pair.access_token.0, clock.now()).await
    );

    clock.advance(ChronoDuration::hours(2));
    println!(
        "two hours later, first access valid -> {}",
        sessions.is_valid(&pair.access_token.0, clock.now()).await
    );
    let report = sessions.compact(clock.now()).await?;
    println!("compaction -> {:?}", report);

    Ok(())
}
