//! Static assets under `/uploads`.

use reqwest::Method;
use tracing::instrument;
use url::Url;

use super::ApiClient;
use crate::error::ApiError;

const UPLOADS_SEGMENT: &str = "uploads";

impl ApiClient {
    /// URL of an uploaded file, e.g. a product's `imagen`.
    ///
    /// The filename is a single path segment; slashes in it are escaped
    /// rather than followed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Url`] for an empty filename or a base URL that
    /// cannot carry a path.
    pub fn asset_url(&self, filename: &str) -> Result<Url, ApiError> {
        if filename.trim().is_empty() {
            return Err(ApiError::Url("empty asset filename".to_string()));
        }
        self.url_from_segments([UPLOADS_SEGMENT, filename])
    }

    /// Download an uploaded file. Assets are public, so no credential is
    /// sent.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with 404 for a missing file, or any other
    /// [`ApiError`].
    #[instrument(skip(self))]
    pub async fn fetch_asset(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.asset_url(filename)?;
        let response = super::ensure_success(self.request_url(Method::GET, url, None).send().await?)
            .await?;
        Ok(response.bytes().await?.to_vec())
    }
}
