use crate::domain_model::{Credential, Subject};
use crate::domain_port::{CredentialStore, StoreError};
use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::warn;

const ARGON2_PREFIX: &str = "$argon2";

enum StoredSecret {
    /// SHA-256 of a plaintext password, so comparison time is independent of the input.
    Plain(Vec<u8>),
    /// Argon2 PHC string, validated at load.
    Argon2(String),
}

impl StoredSecret {
    fn parse(password: &str) -> Result<Self, StoreError> {
        if password.starts_with(ARGON2_PREFIX) {
            PasswordHash::new(password)
                .map_err(|e| StoreError::InvalidCredential(format!("invalid PHC hash: {e}")))?;
            Ok(StoredSecret::Argon2(password.to_owned()))
        } else {
            Ok(StoredSecret::Plain(Sha256::digest(password.as_bytes()).to_vec()))
        }
    }

    fn matches(&self, password: &str) -> Result<bool, StoreError> {
        match self {
            StoredSecret::Plain(digest) => {
                Ok(Sha256::digest(password.as_bytes()).as_slice() == digest.as_slice())
            }
            StoredSecret::Argon2(phc) => {
                let parsed = PasswordHash::new(phc)
                    .map_err(|e| StoreError::InvalidCredential(e.to_string()))?;
                match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                    Ok(()) => Ok(true),
                    Err(argon2::password_hash::Error::Password) => Ok(false),
                    Err(e) => Err(StoreError::Backend(format!("verify error: {e}"))),
                }
            }
        }
    }
}

/// Credentials loaded once at startup and never mutated afterwards.
pub struct MemoryCredentialStore {
    users: HashMap<String, StoredSecret>,
}

impl MemoryCredentialStore {
    pub fn from_credentials(
        credentials: impl IntoIterator<Item = Credential>,
    ) -> Result<Self, StoreError> {
        let mut users = HashMap::new();
        for Credential { username, password } in credentials {
            let secret = StoredSecret::parse(&password)?;
            match users.entry(username) {
                Entry::Occupied(occupied) => {
                    warn!(username = %occupied.key(), "duplicate credential ignored");
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(secret);
                }
            }
        }
        Ok(Self { users })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Subject>, StoreError> {
        let Some(secret) = self.users.get(username) else {
            return Ok(None);
        };
        Ok(secret
            .matches(password)?
            .then(|| Subject::from(username)))
    }
}
