//! Authentication state: where tokens live and who hears about changes.
//!
//! This module provides:
//! - `CredentialStore`: the key-value slot store for the two session tokens,
//!   with in-memory, file-backed and OS keychain implementations
//! - `SessionContext`: the shared handle the gateway reads tokens from and
//!   clears them through, broadcasting `SessionEvent`s to the front end
//!
//! No expiry is tracked locally; an expired token is discovered when the
//! backend answers 401.

pub mod keychain;
pub mod session;
pub mod store;

pub use keychain::KeyringStore;
pub use session::{SessionContext, SessionEvent};
pub use store::{CredentialStore, FileStore, MemoryStore, TokenKey};
