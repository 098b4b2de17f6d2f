//! Credentialed write endpoints.
//!
//! Every method takes the bearer token explicitly and returns the raw
//! [`ApiError`]; callers settle it through [`tienda_storefront::Shop::settle`].
//! Response bodies of writes are ignored.

use reqwest::Method;
use tienda_core::{CategoryId, ProductId};
use tienda_storefront::{ApiClient, ApiError, BearerToken};
use tracing::{info, instrument};

use crate::form::{CategoryForm, ProductForm};

/// Back-office bindings on top of an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct AdminApi {
    api: ApiClient,
}

impl AdminApi {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// `POST /api/productos` as `multipart/form-data`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or is rejected.
    #[instrument(skip(self, form, credential), fields(name = %form.name))]
    pub async fn create_product(
        &self,
        form: &ProductForm,
        credential: &BearerToken,
    ) -> Result<(), ApiError> {
        self.api
            .request(Method::POST, "/api/productos", Some(credential))?
            .multipart(form.to_multipart())
            .send_empty()
            .await?;
        info!("product created");
        Ok(())
    }

    /// `PUT /api/productos/:id` as `multipart/form-data`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or is rejected.
    #[instrument(skip(self, form, credential), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        form: &ProductForm,
        credential: &BearerToken,
    ) -> Result<(), ApiError> {
        self.api
            .request(Method::PUT, &format!("/api/productos/{id}"), Some(credential))?
            .multipart(form.to_multipart())
            .send_empty()
            .await?;
        info!("product updated");
        Ok(())
    }

    /// `DELETE /api/productos/:id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or is rejected.
    #[instrument(skip(self, credential), fields(product_id = %id))]
    pub async fn delete_product(
        &self,
        id: ProductId,
        credential: &BearerToken,
    ) -> Result<(), ApiError> {
        self.api
            .request(Method::DELETE, &format!("/api/productos/{id}"), Some(credential))?
            .send_empty()
            .await?;
        info!("product deleted");
        Ok(())
    }

    /// `POST /api/categorias`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or is rejected.
    #[instrument(skip(self, form, credential), fields(slug = %form.slug()))]
    pub async fn create_category(
        &self,
        form: &CategoryForm,
        credential: &BearerToken,
    ) -> Result<(), ApiError> {
        self.api
            .request(Method::POST, "/api/categorias", Some(credential))?
            .json(&form.body())
            .send_empty()
            .await?;
        info!("category created");
        Ok(())
    }

    /// `PUT /api/categorias/:id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or is rejected.
    #[instrument(skip(self, form, credential), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        form: &CategoryForm,
        credential: &BearerToken,
    ) -> Result<(), ApiError> {
        self.api
            .request(Method::PUT, &format!("/api/categorias/{id}"), Some(credential))?
            .json(&form.body())
            .send_empty()
            .await?;
        info!("category updated");
        Ok(())
    }

    /// `DELETE /api/categorias/:id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the request fails or is rejected.
    #[instrument(skip(self, credential), fields(category_id = %id))]
    pub async fn delete_category(
        &self,
        id: CategoryId,
        credential: &BearerToken,
    ) -> Result<(), ApiError> {
        self.api
            .request(Method::DELETE, &format!("/api/categorias/{id}"), Some(credential))?
            .send_empty()
            .await?;
        info!("category deleted");
        Ok(())
    }
}
