use super::new_refresh_token;
use crate::application_port::*;
use crate::domain_model::{AccessClaims, AccessToken, RefreshRecord, RefreshToken, Subject, TokenPair};
use crate::domain_port::{CredentialStore, RefreshStore, RevocationLedger, StoreError};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct SessionManager {
    credential_store: Arc<dyn CredentialStore>,
    signer: Arc<dyn TokenSigner>,
    revocation_ledger: Arc<dyn RevocationLedger>,
    refresh_store: Arc<dyn RefreshStore>,
    refresh_ttl: Duration,
}

impl SessionManager {
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        signer: Arc<dyn TokenSigner>,
        revocation_ledger: Arc<dyn RevocationLedger>,
        refresh_store: Arc<dyn RefreshStore>,
        refresh_ttl: Duration,
    ) -> Self {
        Self {
            credential_store,
            signer,
            revocation_ledger,
            refresh_store,
            refresh_ttl,
        }
    }

    /// Mint a refresh token for `subject` and install its record.
    pub async fn create_refresh(
        &self,
        subject: &Subject,
        now: DateTime<Utc>,
    ) -> Result<(RefreshToken, DateTime<Utc>), AuthError> {
        let token = new_refresh_token();
        let expires_at = TimeDelta::from_std(self.refresh_ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                error!(ttl = ?self.refresh_ttl, "refresh ttl out of range");
                AuthError::InternalError("refresh ttl out of range".to_string())
            })?;
        let record = RefreshRecord {
            subject: subject.clone(),
            expires_at,
        };

        match self.refresh_store.put(&token, record).await {
            Ok(()) => Ok((token, expires_at)),
            Err(StoreError::Conflict) => {
                error!("refresh token collision");
                Err(AuthError::InternalError(
                    "refresh token collision".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn mint_pair(
        &self,
        subject: &Subject,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        let access = self.signer.issue(subject, now)?;
        let (refresh_token, refresh_exp) = self.create_refresh(subject, now).await?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token,
            access_token_expires_at: access.claims.expires_at(),
            refresh_token_expires_at: refresh_exp,
        })
    }
}

#[async_trait::async_trait]
impl SessionService for SessionManager {
    async fn login(&self, input: LoginInput, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        let LoginInput { username, password } = input;

        let subject = self
            .credential_store
            .verify(&username, &password)
            .await?
            .ok_or_else(|| {
                debug!(%username, "login rejected");
                AuthError::InvalidCredentials
            })?;

        let pair = self.mint_pair(&subject, now).await?;
        info!(%subject, "login succeeded");
        Ok(pair)
    }

    async fn logout(&self, access_token: &str, _now: DateTime<Utc>) {
        // Only tokens this service signed are recorded, so the ledger stays
        // bounded by what was actually issued.
        let claims = match self.signer.verify(&AccessToken(access_token.to_owned())) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "logout with unverifiable token, nothing to revoke");
                return;
            }
        };
        let Some(id) = claims.token_id() else {
            debug!(subject = %claims.sub, "logout with token lacking an id, nothing to revoke");
            return;
        };

        match self.revocation_ledger.revoke(&id, claims.expires_at()).await {
            Ok(()) => info!(subject = %claims.sub, jti = %id, "access token revoked"),
            Err(e) => warn!(jti = %id, error = %e, "failed to record revocation"),
        }
    }

    async fn refresh(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        // Rotation: consume first, mint second. A failure in between loses the
        // session rather than leaving the old token replayable.
        let record = self
            .refresh_store
            .delete(&RefreshToken(refresh_token.to_owned()))
            .await?
            .ok_or(AuthError::UnknownOrUsedRefreshToken)?;

        if !record.is_live(now) {
            debug!(subject = %record.subject, "expired refresh token presented");
            return Err(AuthError::ExpiredRefreshToken);
        }

        let pair = self.mint_pair(&record.subject, now).await?;
        info!(subject = %record.subject, "refresh token rotated");
        Ok(pair)
    }

    async fn authorize(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<AccessClaims, AuthError> {
        let claims = self
            .signer
            .verify(&AccessToken(access_token.to_owned()))?;

        if now < claims.not_before() {
            return Err(AuthError::InvalidToken);
        }
        if now > claims.expires_at() {
            return Err(AuthError::ExpiredToken);
        }
        if let Some(id) = claims.token_id() {
            if self.revocation_ledger.is_revoked(&id, now).await? {
                return Err(AuthError::RevokedToken);
            }
        }

        Ok(claims)
    }

    async fn compact(&self, now: DateTime<Utc>) -> Result<CompactionReport, AuthError> {
        let report = CompactionReport {
            revocations_purged: self.revocation_ledger.purge_expired(now).await?,
            refresh_tokens_purged: self.refresh_store.purge_expired(now).await?,
        };
        debug!(?report, "session state compacted");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{JwtConfig, JwtHs256Signer};
    use crate::domain_model::Credential;
    use crate::infra_memory::{MemoryCredentialStore, MemoryRefreshStore, MemoryRevocationLedger};
    use chrono::Duration as ChronoDuration;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    struct Fixture {
        manager: Arc<SessionManager>,
        refresh_store: Arc<MemoryRefreshStore>,
        revocation_ledger: Arc<MemoryRevocationLedger>,
    }

    fn fixture() -> Fixture {
        let credential_store = Arc::new(
            MemoryCredentialStore::from_credentials(vec![
                Credential {
                    username: "alice".to_string(),
                    password: "secret".to_string(),
                },
                Credential {
                    username: "bob".to_string(),
                    password: "hunter2".to_string(),
                },
            ])
            .unwrap(),
        );
        let signer = Arc::new(JwtHs256Signer::new(JwtConfig {
            issuer: "turnstile".to_string(),
            audience: "records".to_string(),
            access_ttl: Duration::from_secs(3600),
            key_id: None,
            signing_key: b"session-manager-tests".to_vec(),
        }));
        let revocation_ledger = Arc::new(MemoryRevocationLedger::new());
        let refresh_store = Arc::new(MemoryRefreshStore::new());

        let manager = Arc::new(SessionManager::new(
            credential_store,
            signer,
            revocation_ledger.clone(),
            refresh_store.clone(),
            Duration::from_secs(7 * 24 * 60 * 60),
        ));

        Fixture {
            manager,
            refresh_store,
            revocation_ledger,
        }
    }

    fn login_input(username: &str, password: &str) -> LoginInput {
        LoginInput {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn login_with_known_credentials_yields_a_valid_token() {
        let f = fixture();
        let now = Utc::now();

        for (user, pass) in [("alice", "secret"), ("bob", "hunter2")] {
            let pair = f.manager.login(login_input(user, pass), now).await.unwrap();
            assert!(f.manager.is_valid(&pair.access_token.0, now).await);

            let claims = f.manager.authorize(&pair.access_token.0, now).await.unwrap();
            assert_eq!(claims.sub, user);
            assert_eq!(pair.access_token_expires_at, claims.expires_at());
            assert_eq!(
                pair.refresh_token_expires_at,
                now + ChronoDuration::days(7)
            );
        }
    }

    #[tokio::test]
    async fn login_with_bad_credentials_is_rejected_uniformly() {
        let f = fixture();
        let now = Utc::now();

        for (user, pass) in [("alice", "wrong"), ("mallory", "secret"), ("", ""), ("bob", "secret")] {
            let result = f.manager.login(login_input(user, pass), now).await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }
        assert!(f.refresh_store.is_empty());
    }

    #[tokio::test]
    async fn access_tokens_expire_naturally() {
        let f = fixture();
        let now = Utc::now();
        let pair = f.manager.login(login_input("alice", "secret"), now).await.unwrap();
        let token = &pair.access_token.0;
        let exp = pair.access_token_expires_at;

        assert!(f.manager.is_valid(token, exp).await);
        assert!(matches!(
            f.manager.authorize(token, exp + ChronoDuration::seconds(1)).await,
            Err(AuthError::ExpiredToken)
        ));
    }

    #[tokio::test]
    async fn tokens_are_not_valid_before_issue() {
        let f = fixture();
        let now = Utc::now();
        let pair = f.manager.login(login_input("alice", "secret"), now).await.unwrap();
        assert!(!f.manager.is_valid(&pair.access_token.0, now - ChronoDuration::minutes(5)).await);
    }

    #[tokio::test]
    async fn logout_revokes_until_natural_expiry() {
        let f = fixture();
        let now = Utc::now();
        let pair = f.manager.login(login_input("alice", "secret"), now).await.unwrap();
        let token = &pair.access_token.0;

        f.manager.logout(token, now).await;

        for offset in [0, 1, 600, 3599] {
            let later = now + ChronoDuration::seconds(offset);
            assert!(matches!(
                f.manager.authorize(token, later).await,
                Err(AuthError::RevokedToken)
            ));
        }
        // Other sessions of the same user are unaffected.
        let other = f.manager.login(login_input("alice", "secret"), now).await.unwrap();
        assert!(f.manager.is_valid(&other.access_token.0, now).await);
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_tolerates_garbage() {
        let f = fixture();
        let now = Utc::now();
        let pair = f.manager.login(login_input("alice", "secret"), now).await.unwrap();

        f.manager.logout(&pair.access_token.0, now).await;
        f.manager.logout(&pair.access_token.0, now).await;
        f.manager.logout("definitely not a token", now).await;
        f.manager.logout("", now).await;

        assert_eq!(f.revocation_ledger.len(), 1);
    }

    #[tokio::test]
    async fn logout_ignores_tokens_signed_with_another_key() {
        let f = fixture();
        let now = Utc::now();
        let foreign_key = EncodingKey::from_secret(b"someone-else");

        for i in 0..100 {
            let claims = AccessClaims {
                sub: "alice".to_string(),
                iat: now.timestamp(),
                nbf: now.timestamp(),
                exp: 253_402_300_799,
                jti: Some(format!("forged-{i}")),
                iss: "turnstile".to_string(),
                aud: "records".to_string(),
            };
            let forged = encode(&Header::new(Algorithm::HS256), &claims, &foreign_key).unwrap();
            f.manager.logout(&forged, now).await;
        }

        assert_eq!(f.revocation_ledger.len(), 0);
    }

    #[tokio::test]
    async fn out_of_range_refresh_ttl_fails_the_login() {
        let f = fixture();
        let manager = SessionManager {
            refresh_ttl: Duration::from_secs(u64::MAX / 2),
            ..Arc::try_unwrap(f.manager).ok().unwrap()
        };

        let result = manager.login(login_input("alice", "secret"), Utc::now()).await;
        assert!(matches!(result, Err(AuthError::InternalError(_))));
        assert!(f.refresh_store.is_empty());
    }

    #[tokio::test]
    async fn rotation_is_single_use() {
        let f = fixture();
        let now = Utc::now();
        let first = f.manager.login(login_input("alice", "secret"), now).await.unwrap();

        let second = f.manager.refresh(&first.refresh_token.0, now).await.unwrap();
        assert_ne!(second.refresh_token, first.refresh_token);
        assert!(f.manager.is_valid(&second.access_token.0, now).await);

        assert!(matches!(
            f.manager.refresh(&first.refresh_token.0, now).await,
            Err(AuthError::UnknownOrUsedRefreshToken)
        ));
        let third = f.manager.refresh(&second.refresh_token.0, now).await.unwrap();
        let claims = f.manager.authorize(&third.access_token.0, now).await.unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(f.refresh_store.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_rotation_has_exactly_one_winner() {
        let f = fixture();
        let now = Utc::now();
        let pair = f.manager.login(login_input("alice", "secret"), now).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let manager = f.manager.clone();
                let token = pair.refresh_token.0.clone();
                tokio::spawn(async move { manager.refresh(&token, now).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(e) => assert!(matches!(e, AuthError::UnknownOrUsedRefreshToken)),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(f.refresh_store.len(), 1);
    }

    #[tokio::test]
    async fn unknown_refresh_token_leaves_state_untouched() {
        let f = fixture();
        let now = Utc::now();
        let pair = f.manager.login(login_input("alice", "secret"), now).await.unwrap();

        assert!(matches!(
            f.manager.refresh("never-issued", now).await,
            Err(AuthError::UnknownOrUsedRefreshToken)
        ));
        assert_eq!(f.refresh_store.len(), 1);
        assert!(f.manager.refresh(&pair.refresh_token.0, now).await.is_ok());
    }

    #[tokio::test]
    async fn expired_refresh_token_is_rejected_and_dropped() {
        let f = fixture();
        let now = Utc::now();
        let pair = f.manager.login(login_input("alice", "secret"), now).await.unwrap();
        let later = pair.refresh_token_expires_at;

        assert!(matches!(
            f.manager.refresh(&pair.refresh_token.0, later).await,
            Err(AuthError::ExpiredRefreshToken)
        ));
        assert!(matches!(
            f.manager.refresh(&pair.refresh_token.0, now).await,
            Err(AuthError::UnknownOrUsedRefreshToken)
        ));
    }

    #[tokio::test]
    async fn compact_drops_only_dead_entries() {
        let f = fixture();
        let now = Utc::now();
        let a = f.manager.login(login_input("alice", "secret"), now).await.unwrap();
        let b = f.manager.login(login_input("bob", "hunter2"), now).await.unwrap();
        f.manager.logout(&a.access_token.0, now).await;
        f.manager.logout(&b.access_token.0, now).await;

        let report = f.manager.compact(now).await.unwrap();
        assert_eq!(report, CompactionReport::default());

        let report = f.manager.compact(now + ChronoDuration::hours(2)).await.unwrap();
        assert_eq!(report.revocations_purged, 2);
        assert_eq!(report.refresh_tokens_purged, 0);

        let report = f.manager.compact(now + ChronoDuration::days(8)).await.unwrap();
        assert_eq!(report.refresh_tokens_purged, 2);
        assert!(f.refresh_store.is_empty());
    }
}
