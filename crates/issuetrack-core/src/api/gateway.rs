//! Authenticated request gateway.
//!
//! Every call to the backend goes through [`Gateway::request`]. It attaches
//! the bearer token when the request requires authentication (refusing to
//! send anything when there is none), interprets the HTTP status and decodes
//! the JSON body into the caller's response type. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};

use crate::auth::SessionContext;
use crate::config::Config;

use super::ApiError;

/// One call to the backend: where, how, with what, and whether a token is needed.
#[derive(Debug, Clone)]
pub struct ApiRequest<'a, B = ()> {
    pub endpoint: &'a str,
    pub method: Method,
    pub body: Option<&'a B>,
    pub requires_auth: bool,
}

impl<'a> ApiRequest<'a, ()> {
    pub fn get(endpoint: &'a str) -> Self {
        Self {
            endpoint,
            method: Method::GET,
            body: None,
            requires_auth: false,
        }
    }
}

impl<'a, B: Serialize> ApiRequest<'a, B> {
    pub fn post(endpoint: &'a str, body: &'a B) -> Self {
        Self {
            endpoint,
            method: Method::POST,
            body: Some(body),
            requires_auth: false,
        }
    }
}

impl<'a, B> ApiRequest<'a, B> {
    /// Require a stored access token for this request.
    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }
}

/// Gateway to the backend.
/// Clone is cheap - the HTTP client and the session are both shared.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl Gateway {
    pub fn new(config: &Config, session: Arc<SessionContext>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Headers for a request, plus the token that was attached (if any).
    fn headers(&self, requires_auth: bool) -> Result<(header::HeaderMap, Option<String>), ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        if !requires_auth {
            return Ok((headers, None));
        }

        let token = match self.session.access_token()? {
            Some(token) => token,
            None => {
                error!("No access token found, refusing to send authenticated request");
                return Err(ApiError::MissingCredential);
            }
        };

        let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::Store("Stored access token is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);

        Ok((headers, Some(token)))
    }

    /// Perform one request and decode the response into `T`.
    pub async fn request<T, B>(&self, req: ApiRequest<'_, B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let (headers, sent_token) = self.headers(req.requires_auth)?;
        let url = self.url(req.endpoint);

        debug!(method = %req.method, url = %url, auth = req.requires_auth, "Request");

        let mut builder = self.client.request(req.method.clone(), &url).headers(headers);
        if let Some(body) = req.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!(method = %req.method, url = %url, error = %e, "Request failed to send");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!(url = %url, "Unauthorized, clearing access token");
            self.session.expire(sent_token.as_deref())?;
            return Err(ApiError::Unauthorized);
        }

        let text = response.text().await.map_err(|e| {
            error!(url = %url, error = %e, "Failed to read response body");
            ApiError::Transport(e)
        })?;

        if !status.is_success() {
            let body: serde_json::Value =
                serde_json::from_str(&text).map_err(|e| ApiError::decode(&e, &text))?;
            let err = ApiError::from_body(status, &body);
            error!(url = %url, status = status.as_u16(), error = %err, "API error");
            return Err(err);
        }

        debug!(url = %url, status = status.as_u16(), "Response received");
        serde_json::from_str(&text).map_err(|e| {
            error!(url = %url, error = %e, "Failed to decode response");
            ApiError::decode(&e, &text)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(session: Arc<SessionContext>) -> Gateway {
        let config = Config {
            api_base_url: "http://127.0.0.1:5000/".to_string(),
            ..Config::default()
        };
        Gateway::new(&config, session).unwrap()
    }

    #[test]
    fn test_url_joins_base_and_endpoint() {
        let gw = gateway(Arc::new(SessionContext::in_memory()));
        assert_eq!(gw.url("/api/issues"), "http://127.0.0.1:5000/api/issues");
    }

    #[test]
    fn test_headers_without_auth() {
        let gw = gateway(Arc::new(SessionContext::in_memory()));
        let (headers, token) = gw.headers(false).unwrap();
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert!(headers.get(header::AUTHORIZATION).is_none());
        assert!(token.is_none());
    }

    #[test]
    fn test_headers_fail_closed_without_token() {
        let gw = gateway(Arc::new(SessionContext::in_memory()));
        let err = gw.headers(true).unwrap_err();
        assert!(matches!(err, ApiError::MissingCredential));
    }

    #[test]
    fn test_headers_carry_bearer_token() {
        let session = Arc::new(SessionContext::in_memory());
        session.store_login("A", "R").unwrap();
        let gw = gateway(session);

        let (headers, token) = gw.headers(true).unwrap();
        assert_eq!(headers[header::AUTHORIZATION], "Bearer A");
        assert!(headers[header::AUTHORIZATION].is_sensitive());
        assert_eq!(token.as_deref(), Some("A"));
    }

    #[test]
    fn test_request_builders() {
        let get = ApiRequest::get("/api/issues");
        assert_eq!(get.method, Method::GET);
        assert!(get.body.is_none());
        assert!(!get.requires_auth);

        let body = serde_json::json!({});
        let post = ApiRequest::post("/refresh-token", &body).authenticated();
        assert_eq!(post.method, Method::POST);
        assert!(post.requires_auth);
    }
}
