//! `POST /api/login`.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tienda_core::{Email, User};
use tracing::instrument;

use super::ApiClient;
use crate::error::ApiError;

/// Successful login body.
#[derive(Deserialize)]
pub struct LoginResponse {
    /// Raw bearer token.
    pub token: String,
    pub user: User,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Exchange credentials for a token.
    ///
    /// Sent without a bearer header. Bad credentials come back as
    /// [`ApiError::Unauthorized`] carrying the server's message.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or is rejected.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        self.request(Method::POST, "/api/login", None)?
            .json(&LoginRequest {
                email: email.as_str(),
                password: password.expose_secret(),
            })
            .send_json()
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_decodes() {
        let body = r#"{"token":"a.b.c","user":{"id":1,"email":"admin@tienda.com"}}"#;
        let response: LoginResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.token, "a.b.c");
        assert_eq!(response.user.email.as_str(), "admin@tienda.com");
    }

    #[test]
    fn test_login_response_debug_is_redacted() {
        let body = r#"{"token":"secret-token","user":{"id":1,"email":"a@b.co"}}"#;
        let response: LoginResponse = serde_json::from_str(body).unwrap();
        assert!(!format!("{response:?}").contains("secret-token"));
    }
}
