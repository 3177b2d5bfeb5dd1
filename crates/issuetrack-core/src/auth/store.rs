use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Token file name in the data directory
const TOKEN_FILE: &str = "tokens.json";

/// The two named credential slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    Access,
    Refresh,
}

impl TokenKey {
    pub const ALL: [TokenKey; 2] = [TokenKey::Access, TokenKey::Refresh];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKey::Access => "access_token",
            TokenKey::Refresh => "refresh_token",
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted key-value store holding opaque token strings.
///
/// Implementations synchronize internally; `SessionContext` adds the
/// cross-call ordering on top.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: TokenKey) -> Result<Option<String>>;

    fn set(&self, key: TokenKey, value: &str) -> Result<()>;

    /// Remove a slot. Removing an empty slot is not an error.
    fn remove(&self, key: TokenKey) -> Result<()>;

    /// When the slots were last written, if the backend records it.
    fn saved_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<TokenKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(slots.get(&key).cloned())
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<()> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: TokenKey) -> Result<()> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(&key);
        Ok(())
    }
}

// ============================================================================
// File store
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenFile {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub saved_at: Option<DateTime<Utc>>,
}

impl TokenFile {
    fn slot(&mut self, key: TokenKey) -> &mut Option<String> {
        match key {
            TokenKey::Access => &mut self.access_token,
            TokenKey::Refresh => &mut self.refresh_token,
        }
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Tokens persisted as JSON in the data directory.
///
/// The file is read once on open and rewritten on every change; it is
/// deleted once both slots are empty.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: Mutex<TokenFile>,
}

impl FileStore {
    /// Open the token file in `data_dir`, starting empty if it doesn't exist.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(TOKEN_FILE);
        let data = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).context("Failed to read token file")?;
            serde_json::from_str(&contents).context("Failed to parse token file")?
        } else {
            TokenFile::default()
        };
        debug!(path = %path.display(), "Token file opened");

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &TokenFile) -> Result<()> {
        if data.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).context("Failed to remove token file")?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, contents).context("Failed to write token file")?;
        restrict_permissions(&self.path)?;
        Ok(())
    }

    fn update(&self, key: TokenKey, value: Option<&str>) -> Result<()> {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = data.clone();
        *next.slot(key) = value.map(str::to_string);
        next.saved_at = Some(Utc::now());
        self.persist(&next)?;
        *data = next;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .context("Failed to restrict token file permissions")
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

impl CredentialStore for FileStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>> {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(data.slot(key).clone())
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<()> {
        self.update(key, Some(value))
    }

    fn remove(&self, key: TokenKey) -> Result<()> {
        self.update(key, None)
    }

    fn saved_at(&self) -> Option<DateTime<Utc>> {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.saved_at
    }
}
