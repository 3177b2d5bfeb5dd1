use std::sync::{Mutex, PoisonError};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::store::{CredentialStore, MemoryStore, TokenKey};

/// Capacity of the session event channel.
/// Events are rare (one per login/refresh/expiry); slow subscribers only
/// ever miss stale notifications.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Changes to the stored session, broadcast to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    Refreshed,
    /// The backend rejected the access token; the user must log in again.
    Expired,
    LoggedOut,
}

/// Shared handle over the credential store.
///
/// Owned by the application shell and handed to the gateway. Every write
/// goes through `write_lock` so a 401 can compare-and-clear the access token
/// without racing a concurrent login or refresh.
pub struct SessionContext {
    store: Box<dyn CredentialStore>,
    write_lock: Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionContext {
    pub fn new(store: impl CredentialStore + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store: Box::new(store),
            write_lock: Mutex::new(()),
            events,
        }
    }

    /// Session backed by a fresh `MemoryStore`.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn get(&self, key: TokenKey) -> Result<Option<String>> {
        self.store.get(key)
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        self.get(TokenKey::Access)
    }

    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.get(TokenKey::Refresh)
    }

    pub fn set(&self, key: TokenKey, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.set(key, value)
    }

    pub fn clear(&self, key: TokenKey) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.remove(key)
    }

    /// Clear `key` only if it still holds `expected`.
    ///
    /// Returns whether the slot was cleared. A rejection of an old token must
    /// not wipe one written since the request went out.
    pub fn clear_if_current(&self, key: TokenKey, expected: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.store.get(key)? {
            Some(current) if current == expected => {
                self.store.remove(key)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Store both tokens from a successful login.
    pub fn store_login(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.store.set(TokenKey::Access, access_token)?;
            self.store.set(TokenKey::Refresh, refresh_token)?;
        }
        info!("Session tokens stored");
        self.notify(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Overwrite the access token after a successful refresh.
    pub fn store_refreshed(&self, access_token: &str) -> Result<()> {
        self.set(TokenKey::Access, access_token)?;
        debug!("Access token refreshed");
        self.notify(SessionEvent::Refreshed);
        Ok(())
    }

    /// Called by the gateway when the backend answers 401.
    ///
    /// `rejected` is the token the failed request carried; requests sent
    /// without one clear whatever is stored.
    pub(crate) fn expire(&self, rejected: Option<&str>) -> Result<bool> {
        let cleared = match rejected {
            Some(token) => self.clear_if_current(TokenKey::Access, token)?,
            None => {
                let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
                let present = self.store.get(TokenKey::Access)?.is_some();
                if present {
                    self.store.remove(TokenKey::Access)?;
                }
                present
            }
        };
        if cleared {
            self.notify(SessionEvent::Expired);
        } else {
            debug!("Access token unchanged after 401");
        }
        Ok(cleared)
    }

    /// Forget both tokens locally.
    pub fn logout(&self) -> Result<()> {
        {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            for key in TokenKey::ALL {
                self.store.remove(key)?;
            }
        }
        info!("Logged out");
        self.notify(SessionEvent::LoggedOut);
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.access_token(), Ok(Some(_)))
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.store.saved_at()
    }

    fn notify(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}
