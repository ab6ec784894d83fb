use super::new_token_id;
use crate::application_port::{AuthError, IssuedAccessToken, TokenSigner};
use crate::domain_model::{AccessClaims, AccessToken, Subject};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::fmt;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    /// Stamped into the header `kid` when set; verification then requires it.
    pub key_id: Option<String>,
    pub signing_key: Vec<u8>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("key_id", &self.key_id)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

pub struct JwtHs256Signer {
    cfg: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtHs256Signer {
    pub fn new(cfg: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&cfg.signing_key);
        let decoding_key = DecodingKey::from_secret(&cfg.signing_key);

        // The time window is checked by the caller against its own clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp", "nbf", "sub", "iss", "aud"]);
        validation.set_audience(&[cfg.audience.as_str()]);
        validation.set_issuer(&[cfg.issuer.as_str()]);

        Self {
            cfg,
            encoding_key,
            decoding_key,
            validation,
        }
    }
}

impl TokenSigner for JwtHs256Signer {
    fn issue(
        &self,
        subject: &Subject,
        now: DateTime<Utc>,
    ) -> Result<IssuedAccessToken, AuthError> {
        let exp_dt = TimeDelta::from_std(self.cfg.access_ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AuthError::InternalError("access ttl out of range".to_string()))?;
        let claims = AccessClaims {
            sub: subject.0.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp_dt.timestamp(),
            jti: Some(new_token_id().0),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.kid = self.cfg.key_id.clone();

        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;

        Ok(IssuedAccessToken {
            token: AccessToken(token),
            claims,
        })
    }

    fn verify(&self, token: &AccessToken) -> Result<AccessClaims, AuthError> {
        let data = decode::<AccessClaims>(&token.0, &self.decoding_key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "access token rejected");
                AuthError::InvalidToken
            })?;

        if let Some(kid) = &self.cfg.key_id {
            if data.header.kid.as_ref() != Some(kid) {
                debug!(presented = ?data.header.kid, "access token key id mismatch");
                return Err(AuthError::InvalidToken);
            }
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            issuer: "turnstile".to_string(),
            audience: "records".to_string(),
            access_ttl: Duration::from_secs(3600),
            key_id: None,
            signing_key: b"test-signing-key".to_vec(),
        }
    }

    fn forge(header: Header, claims: &AccessClaims, key: &[u8]) -> AccessToken {
        AccessToken(encode(&header, claims, &EncodingKey::from_secret(key)).unwrap())
    }

    #[test]
    fn verify_returns_the_issued_subject() {
        let signer = JwtHs256Signer::new(config());
        let now = Utc::now();

        for name in ["alice", "bob", "", "ünïcødé"] {
            let issued = signer.issue(&Subject::from(name), now).unwrap();
            let claims = signer.verify(&issued.token).unwrap();
            assert_eq!(claims.sub, name);
            assert_eq!(claims, issued.claims);
        }
    }

    #[test]
    fn issued_claims_cover_one_hour() {
        let signer = JwtHs256Signer::new(config());
        let now = Utc::now();
        let claims = signer.issue(&Subject::from("alice"), now).unwrap().claims;

        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.nbf, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.token_id().is_some());
    }

    #[test]
    fn every_token_gets_its_own_id() {
        let signer = JwtHs256Signer::new(config());
        let now = Utc::now();
        let a = signer.issue(&Subject::from("alice"), now).unwrap();
        let b = signer.issue(&Subject::from("alice"), now).unwrap();
        assert_ne!(a.claims.jti, b.claims.jti);
    }

    #[test]
    fn tampered_or_foreign_tokens_are_invalid() {
        let signer = JwtHs256Signer::new(config());
        let issued = signer.issue(&Subject::from("alice"), Utc::now()).unwrap();

        let mut tampered = issued.token.0.clone();
        tampered.pop();
        tampered.push(if issued.token.0.ends_with('A') { 'B' } else { 'A' });
        assert!(matches!(
            signer.verify(&AccessToken(tampered)),
            Err(AuthError::InvalidToken)
        ));

        let foreign = forge(Header::new(Algorithm::HS256), &issued.claims, b"other-key");
        assert!(matches!(signer.verify(&foreign), Err(AuthError::InvalidToken)));

        assert!(matches!(
            signer.verify(&AccessToken("not.a.jwt".to_string())),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn other_algorithms_are_rejected_even_with_the_right_key() {
        let signer = JwtHs256Signer::new(config());
        let claims = signer.issue(&Subject::from("alice"), Utc::now()).unwrap().claims;
        let token = forge(Header::new(Algorithm::HS512), &claims, b"test-signing-key");
        assert!(matches!(signer.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn issuer_and_audience_must_match() {
        let signer = JwtHs256Signer::new(config());
        let mut claims = signer.issue(&Subject::from("alice"), Utc::now()).unwrap().claims;
        claims.aud = "someone-else".to_string();
        let token = forge(Header::new(Algorithm::HS256), &claims, b"test-signing-key");
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn verify_ignores_the_time_window() {
        let signer = JwtHs256Signer::new(config());
        let long_ago = Utc::now() - chrono::Duration::days(30);
        let issued = signer.issue(&Subject::from("alice"), long_ago).unwrap();
        assert!(signer.verify(&issued.token).is_ok());
    }

    #[test]
    fn key_id_is_enforced_when_configured() {
        let signer = JwtHs256Signer::new(JwtConfig {
            key_id: Some("k1".to_string()),
            ..config()
        });
        let issued = signer.issue(&Subject::from("alice"), Utc::now()).unwrap();
        assert!(signer.verify(&issued.token).is_ok());

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("k2".to_string());
        let token = forge(header, &issued.claims, b"test-signing-key");
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn out_of_range_ttl_is_an_error_not_a_panic() {
        let signer = JwtHs256Signer::new(JwtConfig {
            access_ttl: Duration::from_secs(u64::MAX / 2),
            ..config()
        });
        assert!(matches!(
            signer.issue(&Subject::from("alice"), Utc::now()),
            Err(AuthError::InternalError(_))
        ));
    }
}
