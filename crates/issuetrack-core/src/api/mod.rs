//! REST API module for the issue tracking backend.
//!
//! `Gateway` is the single place where requests are built and sent: it
//! injects the bearer token, interprets the HTTP status and decodes the body.
//! `ApiClient` layers the backend's endpoints on top of it.
//!
//! The backend uses bearer token authentication obtained from the login
//! endpoint; tokens are held by a `SessionContext`.

pub mod client;
pub mod error;
pub mod gateway;

pub use client::{ApiClient, RefreshOutcome};
pub use error::{ApiError, ErrorCategory};
pub use gateway::{ApiRequest, Gateway};
