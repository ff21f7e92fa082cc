//! Authentication utilities for the Alpaca API

use crate::config::types::ApiCredentials;

/// Header carrying the API key id
pub const KEY_ID_HEADER: &str = "APCA-API-KEY-ID";

/// Header carrying the API secret
pub const SECRET_KEY_HEADER: &str = "APCA-API-SECRET-KEY";

/// Authentication headers for API requests
#[derive(Clone)]
pub struct AuthHeaders {
    pub api_key: String,
    pub api_secret: String,
}

impl AuthHeaders {
    pub fn new(credentials: &ApiCredentials) -> Self {
        Self {
            api_key: credentials.api_key.clone(),
            api_secret: credentials.api_secret.clone(),
        }
    }

    /// Add authentication headers to a reqwest RequestBuilder
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(KEY_ID_HEADER, &self.api_key)
            .header(SECRET_KEY_HEADER, &self.api_secret)
    }
}

impl std::fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("api_key", &"<REDACTED>")
            .field("api_secret", &"<REDACTED>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_applied() {
        let headers = AuthHeaders::new(&ApiCredentials::new("PKTEST", "secret"));
        let request = headers
            .apply_to_request(reqwest::Client::new().get("http://localhost/v2/account"))
            .build()
            .unwrap();

        assert_eq!(request.headers()[KEY_ID_HEADER], "PKTEST");
        assert_eq!(request.headers()[SECRET_KEY_HEADER], "secret");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let headers = AuthHeaders::new(&ApiCredentials::new("PKTEST", "hunter2"));
        let printed = format!("{:?}", headers);
        assert!(!printed.contains("PKTEST"));
        assert!(!printed.contains("hunter2"));
    }
}
