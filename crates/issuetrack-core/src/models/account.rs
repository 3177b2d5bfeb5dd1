use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_serializes_fields() {
        let body = serde_json::to_value(LoginRequest {
            username: "alice",
            password: "pw123",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"username": "alice", "password": "pw123"}));
    }

    #[test]
    fn test_login_response_ignores_extra_fields() {
        let json = r#"{"access_token":"A","refresh_token":"R","token_type":"bearer"}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.access_token, "A");
        assert_eq!(resp.refresh_token, "R");
    }

    #[test]
    fn test_login_response_requires_refresh_token() {
        let json = r#"{"access_token":"A"}"#;
        assert!(serde_json::from_str::<LoginResponse>(json).is_err());
    }
}
