//! Data models for the issue tracking backend.
//!
//! - `Issue`, `IssueDraft`: reported issues and the unvalidated form input
//! - `LoginRequest`, `LoginResponse`, `RegisterRequest`, `RefreshResponse`:
//!   per-endpoint request and response schemas for authentication

pub mod account;
pub mod issue;

pub use account::{LoginRequest, LoginResponse, RefreshResponse, RegisterRequest};
pub use issue::{DraftError, Issue, IssueDraft};
