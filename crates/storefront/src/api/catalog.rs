//! Public catalog endpoints: products, categories and pages.

use reqwest::Method;
use tienda_core::{Category, CategoryId, Page, Product, ProductId, ProductSummary};
use tracing::instrument;

use super::ApiClient;
use crate::error::ApiError;
use crate::session::BearerToken;

impl ApiClient {
    /// `GET /api/productos`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or the body is not a product
    /// list.
    #[instrument(skip(self, credential))]
    pub async fn list_products(
        &self,
        credential: Option<&BearerToken>,
    ) -> Result<Vec<ProductSummary>, ApiError> {
        self.get_json("/api/productos", credential).await
    }

    /// `GET /api/productos/:id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with 404 for an unknown product, or any
    /// other [`ApiError`].
    #[instrument(skip(self, credential), fields(product_id = %id))]
    pub async fn get_product(
        &self,
        id: ProductId,
        credential: Option<&BearerToken>,
    ) -> Result<Product, ApiError> {
        self.get_json(&format!("/api/productos/{id}"), credential)
            .await
    }

    /// `GET /api/categorias`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    #[instrument(skip(self, credential))]
    pub async fn list_categories(
        &self,
        credential: Option<&BearerToken>,
    ) -> Result<Vec<Category>, ApiError> {
        self.get_json("/api/categorias", credential).await
    }

    /// `GET /api/categorias/:id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    #[instrument(skip(self, credential), fields(category_id = %id))]
    pub async fn get_category(
        &self,
        id: CategoryId,
        credential: Option<&BearerToken>,
    ) -> Result<Category, ApiError> {
        self.get_json(&format!("/api/categorias/{id}"), credential)
            .await
    }

    /// `GET /api/paginas`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    #[instrument(skip(self, credential))]
    pub async fn list_pages(&self, credential: Option<&BearerToken>) -> Result<Vec<Page>, ApiError> {
        self.get_json("/api/paginas", credential).await
    }

    /// `GET /api/paginas/:slug`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on failure.
    #[instrument(skip(self, credential))]
    pub async fn get_page(
        &self,
        slug: &str,
        credential: Option<&BearerToken>,
    ) -> Result<Page, ApiError> {
        // The slug is one segment even if it contains a slash.
        let url = self.url_from_segments(["api", "paginas", slug])?;
        self.request_url(Method::GET, url, credential)
            .send_json()
            .await
    }
}
