use anyhow::{Context, Result};
use keyring::Entry;

use super::store::{CredentialStore, TokenKey};

const SERVICE_NAME: &str = "issuetrack";

/// Tokens kept in the OS keychain, one entry per slot.
///
/// Entries are created once and reused for every access.
pub struct KeyringStore {
    service: String,
    access: Entry,
    refresh: Entry,
}

impl KeyringStore {
    pub fn new() -> Result<Self> {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a custom keychain service name (one per backend profile).
    pub fn with_service(service: impl Into<String>) -> Result<Self> {
        let service = service.into();
        let access = Entry::new(&service, TokenKey::Access.as_str())
            .context("Failed to create keyring entry")?;
        let refresh = Entry::new(&service, TokenKey::Refresh.as_str())
            .context("Failed to create keyring entry")?;
        Ok(Self {
            service,
            access,
            refresh,
        })
    }

    fn entry(&self, key: TokenKey) -> &Entry {
        match key {
            TokenKey::Access => &self.access,
            TokenKey::Refresh => &self.refresh,
        }
    }
}

impl std::fmt::Debug for KeyringStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringStore")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>> {
        match self.entry(key).get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<()> {
        self.entry(key)
            .set_password(value)
            .context("Failed to store token in keychain")
    }

    fn remove(&self, key: TokenKey) -> Result<()> {
        match self.entry(key).delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}
