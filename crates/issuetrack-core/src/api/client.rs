//! API client for the issue tracking backend.
//!
//! Each operation is a single gateway call with fixed parameters; the only
//! extra work is storing tokens after login and refresh.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::auth::SessionContext;
use crate::config::Config;
use crate::models::{Issue, LoginRequest, LoginResponse, RefreshResponse, RegisterRequest};

use super::{ApiError, ApiRequest, Gateway};

// ============================================================================
// Endpoints
// ============================================================================

const REGISTER_ENDPOINT: &str = "/register";
const LOGIN_ENDPOINT: &str = "/api/auth/login";
const REFRESH_ENDPOINT: &str = "/refresh-token";
const ISSUES_ENDPOINT: &str = "/api/issues";

/// Result of a token refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new access token was fetched and stored.
    Refreshed,
    /// No refresh token is stored locally; nothing was sent.
    Skipped,
}

/// API client for the issue tracking backend.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Gateway,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<SessionContext>) -> Result<Self, ApiError> {
        Ok(Self {
            gateway: Gateway::new(config, session)?,
        })
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        self.gateway.session()
    }

    /// Create a new account. The backend's reply is returned as-is.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Value, ApiError> {
        let body = RegisterRequest {
            username,
            email,
            password,
        };
        let reply = self
            .gateway
            .request(ApiRequest::post(REGISTER_ENDPOINT, &body))
            .await?;
        info!(username = username, "Registration successful");
        Ok(reply)
    }

    /// Log in and persist both tokens.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        debug!(username = username, "Logging in");
        let body = LoginRequest { username, password };
        let tokens: LoginResponse = self
            .gateway
            .request(ApiRequest::post(LOGIN_ENDPOINT, &body))
            .await?;

        if tokens.access_token.is_empty() {
            warn!("Login response did not include an access token");
            return Err(ApiError::Decode(
                "login response did not include an access token".to_string(),
            ));
        }

        self.session()
            .store_login(&tokens.access_token, &tokens.refresh_token)?;
        info!(username = username, "Login successful");
        Ok(tokens)
    }

    /// Exchange the current access token for a new one.
    ///
    /// Skipped without any request when no refresh token is stored.
    pub async fn refresh_token(&self) -> Result<RefreshOutcome, ApiError> {
        if self.session().refresh_token()?.is_none() {
            debug!("No refresh token stored, skipping refresh");
            return Ok(RefreshOutcome::Skipped);
        }

        let body = json!({});
        let refreshed: RefreshResponse = self
            .gateway
            .request(ApiRequest::post(REFRESH_ENDPOINT, &body).authenticated())
            .await?;

        self.session().store_refreshed(&refreshed.access_token)?;
        Ok(RefreshOutcome::Refreshed)
    }

    /// Submit a new issue. Requires a logged-in session.
    pub async fn create_issue(&self, issue: &Issue) -> Result<Value, ApiError> {
        debug!(title = %issue.title, "Sending issue");
        let reply = self
            .gateway
            .request(ApiRequest::post(ISSUES_ENDPOINT, issue).authenticated())
            .await?;
        info!(title = %issue.title, "Issue created");
        Ok(reply)
    }

    /// Fetch all reported issues. An empty list is a normal result.
    pub async fn list_issues(&self) -> Result<Vec<Issue>, ApiError> {
        let issues: Vec<Issue> = self.gateway.request(ApiRequest::get(ISSUES_ENDPOINT)).await?;
        if issues.is_empty() {
            debug!("No issues found");
        }
        Ok(issues)
    }

    /// Forget the stored tokens. No request is made.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().logout()?;
        Ok(())
    }
}
