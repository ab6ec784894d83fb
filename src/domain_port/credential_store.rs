use super::StoreError;
use crate::domain_model::Subject;

#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the subject when `username` exists and `password` matches.
    /// Unknown usernames and wrong passwords are indistinguishable (`None`).
    async fn verify(&self, username: &str, password: &str)
    -> Result<Option<Subject>, StoreError>;
}
