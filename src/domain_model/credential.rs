use serde::Deserialize;
use std::fmt;

/// A username/password pair as loaded from settings. The password is either
/// plaintext or an Argon2 PHC string (`$argon2id$...`).
#[derive(Clone, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
