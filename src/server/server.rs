use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::logger::*;
use crate::server::{Compactor, resolve_signing_secret};
use crate::settings::Settings;
use anyhow::{Context, anyhow};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Server {
    pub session_service: Arc<dyn SessionService>,
    pub clock: Arc<dyn Clock>,
    compactor_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Server {
    pub fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        Self::try_with_clock(settings, Arc::new(SystemClock))
    }

    /// Must be called inside a tokio runtime when compaction is enabled.
    pub fn try_with_clock(settings: &Settings, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let auth = &settings.auth;
        let access_ttl = checked_ttl("access_ttl_secs", auth.access_ttl_secs, clock.now())?;
        let refresh_ttl = checked_ttl("refresh_ttl_secs", auth.refresh_ttl_secs, clock.now())?;

        let credential_store: Arc<dyn CredentialStore> =
            Arc::new(MemoryCredentialStore::from_credentials(auth.users.iter().cloned())?);
        if auth.users.is_empty() {
            warn!("no users configured, every login will fail");
        }

        let key = resolve_signing_secret(
            &auth.secret_env,
            std::env::var(&auth.secret_env).ok(),
            auth.require_secret,
        )?;
        let signer: Arc<dyn TokenSigner> = Arc::new(JwtHs256Signer::new(JwtConfig {
            issuer: auth.issuer.clone(),
            audience: auth.audience.clone(),
            access_ttl,
            key_id: auth.key_id.clone(),
            signing_key: key,
        }));

        let revocation_ledger: Arc<dyn RevocationLedger> = Arc::new(MemoryRevocationLedger::new());
        let refresh_store: Arc<dyn RefreshStore> = Arc::new(MemoryRefreshStore::new());

        let session_service: Arc<dyn SessionService> = Arc::new(SessionManager::new(
            credential_store,
            signer,
            revocation_ledger,
            refresh_store,
            refresh_ttl,
        ));

        let cancel = CancellationToken::new();
        let compactor_handle = match auth.compaction_interval_secs {
            0 => None,
            secs => {
                let compactor = Compactor::new(
                    session_service.clone(),
                    clock.clone(),
                    Duration::from_secs(secs),
                    cancel.clone(),
                );
                Some(tokio::spawn(async move { compactor.run().await }))
            }
        };

        info!(
            users = auth.users.len(),
            access_ttl_secs = auth.access_ttl_secs,
            refresh_ttl_secs = auth.refresh_ttl_secs,
            "server started"
        );

        Ok(Self {
            session_service,
            clock,
            compactor_handle: Mutex::new(compactor_handle),
            cancel,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = self
            .compactor_handle
            .lock()
            .ok()
            .and_then(|mut lock| lock.take());
        if let Some(handle) = handle {
            let r = handle.await;
            info!("compactor handle dropped: {:?}", r);
        }
    }
}

/// A ttl that would overflow timestamp arithmetic is a configuration error.
fn checked_ttl(name: &str, secs: u64, now: DateTime<Utc>) -> anyhow::Result<Duration> {
    let ttl = Duration::from_secs(secs);
    let delta = TimeDelta::from_std(ttl).with_context(|| format!("auth.{name} is out of range"))?;
    now.checked_add_signed(delta)
        .ok_or_else(|| anyhow!("auth.{name} is out of range"))?;
    Ok(ttl)
}
