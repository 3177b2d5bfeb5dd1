//! Application state for the issuetrack front end.
//!
//! `App` sits on top of `ApiClient`: each `submit_*` method runs one backend
//! operation and turns its outcome into a screen change and a user-visible
//! notice. Session changes reported by the gateway (an expired token in
//! particular) are drained from the event channel after every operation.

use issuetrack_core::{ApiClient, ApiError, ErrorCategory, IssueDraft, RefreshOutcome, SessionEvent};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, error, info, warn};

use crate::render::render_issue;

// ============================================================================
// User-facing messages
// ============================================================================

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
pub const REGISTRATION_SUCCESS: &str = "Registration successful. You can now log in.";
pub const ISSUE_CREATED: &str = "Issue created successfully";
pub const FILL_ALL_FIELDS: &str = "Please fill in all fields before submitting!";
pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";
pub const NO_ISSUES: &str = "No issues found.";

/// Which screen the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Dashboard,
    ReportIssue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message to show the user once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

pub struct App {
    api: ApiClient,
    session_events: broadcast::Receiver<SessionEvent>,

    pub screen: Screen,
    pub notice: Option<Notice>,
    /// Rendered issue list, one fragment per issue
    pub issue_fragments: Vec<String>,
}

impl App {
    pub fn new(api: ApiClient) -> Self {
        let session_events = api.session().subscribe();
        let screen = if api.session().is_logged_in() {
            Screen::Dashboard
        } else {
            Screen::Login
        };
        debug!(?screen, "App created");

        Self {
            api,
            session_events,
            screen,
            notice: None,
            issue_fragments: Vec::new(),
        }
    }

    /// Take the pending notice, if any.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in with the form credentials. Returns whether it succeeded.
    pub async fn submit_login(&mut self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            self.notice = Some(Notice::error("Username and password required"));
            return false;
        }

        let result = self.api.login(username, password).await;
        // A rejected login may clear an older token; the login notice wins
        // over the expiry one.
        self.process_session_events();

        match result {
            Ok(_) => {
                self.notice = Some(Notice::info(LOGIN_SUCCESS));
                self.screen = Screen::Dashboard;
                true
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                let text = match e.category() {
                    ErrorCategory::Transport => friendly_error(&e),
                    _ => LOGIN_FAILED.to_string(),
                };
                self.notice = Some(Notice::error(text));
                self.screen = Screen::Login;
                false
            }
        }
    }

    pub async fn submit_registration(&mut self, username: &str, email: &str, password: &str) -> bool {
        self.screen = Screen::Register;
        let ok = match self.api.register(username, email, password).await {
            Ok(_) => {
                self.notice = Some(Notice::info(REGISTRATION_SUCCESS));
                self.screen = Screen::Login;
                true
            }
            Err(e) => {
                error!(error = %e, "Registration failed");
                self.fail(&e, format!("Registration failed: {}", friendly_error(&e)));
                false
            }
        };
        self.process_session_events();
        ok
    }

    /// Refresh the access token if a refresh token is stored.
    pub async fn refresh_session(&mut self) -> bool {
        let ok = match self.api.refresh_token().await {
            Ok(RefreshOutcome::Refreshed) => {
                self.notice = Some(Notice::info("Session refreshed"));
                true
            }
            Ok(RefreshOutcome::Skipped) => {
                self.notice = Some(Notice::info("No refresh token stored, nothing to do"));
                true
            }
            Err(e) => {
                error!(error = %e, "Token refresh failed");
                self.fail(&e, format!("Token refresh failed: {}", friendly_error(&e)));
                false
            }
        };
        self.process_session_events();
        ok
    }

    pub fn logout(&mut self) -> bool {
        let ok = match self.api.logout() {
            Ok(()) => {
                self.notice = Some(Notice::info("Logged out"));
                true
            }
            Err(e) => {
                error!(error = %e, "Logout failed");
                self.notice = Some(Notice::error(friendly_error(&e)));
                false
            }
        };
        self.process_session_events();
        ok
    }

    // =========================================================================
    // Issues
    // =========================================================================

    /// Validate and submit an issue. Returns whether it was created.
    pub async fn submit_issue(&mut self, draft: &IssueDraft) -> bool {
        self.screen = Screen::ReportIssue;
        let issue = match draft.validate() {
            Ok(issue) => issue,
            Err(e) => {
                debug!(error = %e, "Issue draft rejected");
                self.notice = Some(Notice::error(FILL_ALL_FIELDS));
                return false;
            }
        };

        let ok = match self.api.create_issue(&issue).await {
            Ok(_) => {
                self.notice = Some(Notice::info(ISSUE_CREATED));
                self.screen = Screen::Dashboard;
                true
            }
            Err(e) => {
                error!(error = %e, "Issue creation failed");
                self.fail(&e, format!("Issue creation failed: {}", friendly_error(&e)));
                false
            }
        };
        self.process_session_events();
        ok
    }

    /// Fetch and render the issue list. Returns the number of issues shown.
    pub async fn load_issues(&mut self) -> usize {
        match self.api.list_issues().await {
            Ok(issues) => {
                self.issue_fragments = issues.iter().map(render_issue).collect();
                if issues.is_empty() {
                    warn!("No issues found");
                    self.notice = Some(Notice::info(NO_ISSUES));
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to load issues");
                self.fail(&e, format!("Failed to load issues: {}", friendly_error(&e)));
            }
        }
        self.process_session_events();
        self.issue_fragments.len()
    }

    /// Record a failed operation. Any 401 sends the user back to login,
    /// whether or not it cleared a stored token.
    fn fail(&mut self, err: &ApiError, text: String) {
        if err.category() == ErrorCategory::Unauthorized {
            self.screen = Screen::Login;
            self.notice = Some(Notice::error(SESSION_EXPIRED));
        } else {
            self.notice = Some(Notice::error(text));
        }
    }

    // =========================================================================
    // Session events
    // =========================================================================

    /// Apply pending session events to the UI state.
    pub fn process_session_events(&mut self) {
        loop {
            match self.session_events.try_recv() {
                Ok(SessionEvent::Expired) => {
                    info!("Session expired, returning to login");
                    self.screen = Screen::Login;
                    self.notice = Some(Notice::error(SESSION_EXPIRED));
                }
                Ok(SessionEvent::LoggedOut) => {
                    self.screen = Screen::Login;
                    self.issue_fragments.clear();
                }
                Ok(SessionEvent::LoggedIn) | Ok(SessionEvent::Refreshed) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed session events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}

/// User-friendly text for a failed operation.
pub fn friendly_error(err: &ApiError) -> String {
    match err.category() {
        ErrorCategory::MissingCredential => "You are not logged in. Please log in first.".to_string(),
        ErrorCategory::Transport => {
            "Unable to connect to server. Check your connection.".to_string()
        }
        ErrorCategory::Unauthorized => SESSION_EXPIRED.to_string(),
        ErrorCategory::Decode => "The server sent an unexpected response.".to_string(),
        ErrorCategory::Application | ErrorCategory::Store => err.user_message(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use issuetrack_core::{Config, SessionContext};

    fn offline_app() -> App {
        // Nothing listens here; tests below never reach the network.
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        let session = Arc::new(SessionContext::in_memory());
        App::new(ApiClient::new(&config, session).unwrap())
    }

    #[test]
    fn test_starts_on_login_without_session() {
        let app = offline_app();
        assert_eq!(app.screen, Screen::Login);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_starts_on_dashboard_with_session() {
        let session = Arc::new(SessionContext::in_memory());
        session.store_login("A", "R").unwrap();
        let client = ApiClient::new(&Config::default(), session).unwrap();
        assert_eq!(App::new(client).screen, Screen::Dashboard);
    }

    #[tokio::test]
    async fn test_submit_issue_rejects_blank_fields() {
        let mut app = offline_app();
        let draft = IssueDraft::new("Pothole", "  ", "Deep");
        assert!(!app.submit_issue(&draft).await);
        assert_eq!(app.take_notice(), Some(Notice::error(FILL_ALL_FIELDS)));
        assert_eq!(app.screen, Screen::ReportIssue);
    }

    #[tokio::test]
    async fn test_submit_login_requires_both_fields() {
        let mut app = offline_app();
        assert!(!app.submit_login("alice", "").await);
        assert!(app.notice.as_ref().is_some_and(Notice::is_error));
        assert_eq!(app.screen, Screen::Login);
    }

    #[test]
    fn test_logout_returns_to_login() {
        let session = Arc::new(SessionContext::in_memory());
        session.store_login("A", "R").unwrap();
        let client = ApiClient::new(&Config::default(), session.clone()).unwrap();
        let mut app = App::new(client);
        app.issue_fragments.push("Pothole".to_string());

        assert!(app.logout());
        assert_eq!(app.screen, Screen::Login);
        assert!(app.issue_fragments.is_empty());
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_friendly_error_messages() {
        assert_eq!(
            friendly_error(&ApiError::Application {
                status: 422,
                message: "Title too long".to_string()
            }),
            "Title too long"
        );
        assert_eq!(friendly_error(&ApiError::Unauthorized), SESSION_EXPIRED);
        assert!(friendly_error(&ApiError::MissingCredential).contains("log in"));
    }
}
