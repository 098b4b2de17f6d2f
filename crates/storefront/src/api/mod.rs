//! REST gateway client for the store API.
//!
//! [`ApiClient`] holds nothing but the HTTP client and the base URL. The
//! credential is an explicit argument on every call, so there is no shared
//! mutable auth header that could leak between sessions.
//!
//! Every response goes through [`ApiRequest::send`], which classifies it:
//!
//! | Status  | Result                         |
//! |---------|--------------------------------|
//! | 401     | [`ApiError::Unauthorized`]     |
//! | 403     | [`ApiError::Forbidden`]        |
//! | ≥ 500   | [`ApiError::Server`]           |
//! | other   | passed through unmodified      |
//!
//! What a 401 does to client state is decided by
//! [`crate::shop::Shop::settle`], not here.

mod assets;
mod auth;
mod catalog;

pub use auth::LoginResponse;

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, info_span, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::BearerToken;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Store API client.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the API at `config.api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("tienda/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
        })
    }

    /// Base URL every endpoint path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve an endpoint path such as `/api/productos/3` against the base
    /// URL. Any path prefix on the base URL is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if the base URL cannot carry a path.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.url_from_segments(path.split('/').filter(|s| !s.is_empty()))
    }

    fn url_from_segments<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Url(format!("{} cannot be a base", self.inner.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request. `credential` becomes the `Authorization: Bearer`
    /// header when present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] if `path` cannot be resolved.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        credential: Option<&BearerToken>,
    ) -> Result<ApiRequest, ApiError> {
        let url = self.url(path)?;
        Ok(self.request_url(method, url, credential))
    }

    fn request_url(&self, method: Method, url: Url, credential: Option<&BearerToken>) -> ApiRequest {
        let request_id = Uuid::new_v4();
        let path = url.path().to_string();

        let mut builder = self
            .inner
            .client
            .request(method.clone(), url)
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = credential {
            builder = builder.bearer_auth(token.expose());
        }

        ApiRequest {
            builder,
            method,
            path,
            request_id,
        }
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, a non-success status or an
    /// unexpected body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&BearerToken>,
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, credential)?.send_json().await
    }
}

/// A request with its credential already captured.
pub struct ApiRequest {
    builder: reqwest::RequestBuilder,
    method: Method,
    path: String,
    request_id: Uuid,
}

impl ApiRequest {
    /// Attach a JSON body.
    #[must_use]
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.builder = self.builder.json(body);
        self
    }

    /// Attach a multipart form body.
    #[must_use]
    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.builder = self.builder.multipart(form);
        self
    }

    /// Request id sent in the `x-request-id` header.
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Send the request and classify the response.
    ///
    /// 401, 403 and 5xx become errors; every other status, success or not,
    /// is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the request never completed, or the
    /// classified error for 401/403/5xx.
    pub async fn send(self) -> Result<Response, ApiError> {
        let span = info_span!(
            "api_request",
            method = %self.method,
            path = %self.path,
            request_id = %self.request_id,
        );

        async move {
            let response = self.builder.send().await.inspect_err(|e| {
                warn!(error = %e, "request did not complete");
            })?;
            let status = response.status();
            debug!(status = status.as_u16(), "response received");

            if status == StatusCode::UNAUTHORIZED {
                let message = error_message(response).await;
                return Err(ApiError::Unauthorized { message });
            }
            if status == StatusCode::FORBIDDEN {
                let message = error_message(response).await;
                return Err(ApiError::Forbidden(
                    message.unwrap_or_else(|| "permission denied".to_string()),
                ));
            }
            if status.is_server_error() {
                let message = error_message(response).await;
                warn!(status = status.as_u16(), message = ?message, "server error");
                return Err(ApiError::Server {
                    status,
                    message: message.unwrap_or_else(|| "server error".to_string()),
                });
            }

            Ok(response)
        }
        .instrument(span)
        .await
    }

    /// Send and decode a JSON body. Non-success statuses that passed through
    /// [`ApiRequest::send`] become [`ApiError::Status`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn send_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let response = ensure_success(self.send().await?).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Send and discard the body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any failure.
    pub async fn send_empty(self) -> Result<(), ApiError> {
        ensure_success(self.send().await?).await?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Server message from an `{"error": "..."}` body, if there is one.
async fn error_message(response: Response) -> Option<String> {
    let body = response.bytes().await.ok()?;
    parse_error_body(&body)
}

fn parse_error_body(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|m| !m.is_empty())
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = error_message(response)
        .await
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(ApiError::Status { status, message })
}
