//! Password reuse prevention.

use std::sync::Arc;

use uuid::Uuid;

use skybook_core::error::AppError;
use skybook_database::CredentialStore;

use super::hasher::PasswordHasher;

/// Rejects passwords matching one of the user's most recent hashes.
#[derive(Debug, Clone)]
pub struct PasswordHistoryChecker {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<PasswordHasher>,
    depth: usize,
}

impl PasswordHistoryChecker {
    /// Creates a checker consulting the last `depth` entries.
    pub fn new(store: Arc<dyn CredentialStore>, hasher: Arc<PasswordHasher>, depth: usize) -> Self {
        Self {
            store,
            hasher,
            depth,
        }
    }

    /// Fails with a policy violation when `candidate` verifies against any
    /// recent hash. A verification error also fails closed.
    pub async fn check_reuse(&self, user_id: Uuid, candidate: &str) -> Result<(), AppError> {
        if self.depth == 0 {
            return Ok(());
        }
        let hashes = self.store.recent_password_hashes(user_id, self.depth).await?;
        for hash in &hashes {
            if self.hasher.verify_password(candidate, hash)? {
                return Err(AppError::policy_violation(format!(
                    "Password was used recently. Choose one not among your last {} passwords",
                    self.depth
                )));
            }
        }
        Ok(())
    }
}
