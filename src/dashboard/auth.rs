use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Demo account seeded into every store until real account management exists.
pub const DEMO_AGENT_EMAIL: &str = "agent@example.com";
const DEMO_AGENT_PASSWORD: &str = "password123";

/// Fixed in-memory credential set.
///
/// Secrets are stored as unsalted SHA-256 hex digests and verified by digest
/// equality. Unknown accounts and wrong passwords produce the same error so a
/// caller cannot probe which identifiers exist.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    secrets: BTreeMap<String, String>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            secrets: BTreeMap::new(),
        }
    }

    /// Store seeded with the single demo agent account.
    pub fn demo() -> Self {
        let mut store = Self::new();
        store.seed(DEMO_AGENT_EMAIL, DEMO_AGENT_PASSWORD);
        store
    }

    /// Register an account. The plaintext secret is digested immediately and
    /// never retained.
    pub fn seed(&mut self, email: impl Into<String>, password: &str) {
        self.secrets.insert(email.into(), digest_secret(password));
    }

    /// Check an identifier/secret pair against the stored set.
    pub fn verify(&self, email: &str, password: &str) -> Result<(), CredentialError> {
        let presented = digest_secret(password);
        match self.secrets.get(email) {
            Some(stored) if *stored == presented => Ok(()),
            _ => Err(CredentialError::InvalidCredentials),
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::demo()
    }
}

fn digest_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Single authentication failure; unknown identifier and digest mismatch are
/// indistinguishable on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("invalid email or password")]
    InvalidCredentials,
}
