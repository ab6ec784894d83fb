use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity an access or refresh token is issued to. For this service it is
/// the username a credential was loaded under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(pub String);

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Subject {
    fn from(value: &str) -> Self {
        Subject(value.to_owned())
    }
}
