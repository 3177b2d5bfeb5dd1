//! Core library for issuetrack.
//!
//! Provides the authenticated request gateway, the caller operations built on
//! it (login, registration, token refresh, issue creation and listing), the
//! session context with its pluggable credential stores, and configuration.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ErrorCategory, Gateway, RefreshOutcome};
pub use auth::{CredentialStore, SessionContext, SessionEvent, TokenKey};
pub use config::{Config, CredentialBackend};
pub use models::{DraftError, Issue, IssueDraft, LoginResponse};
