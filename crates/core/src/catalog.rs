//! Catalog records as served by the storefront API.
//!
//! Field names follow the backend's JSON (`nombre`, `precio`, ...) through
//! `#[serde(rename)]`; the Rust side uses English names.

use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, Email, PageId, Price, ProductId, UserId, Visibility};

/// A product row from `GET /api/productos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion_corta", default)]
    pub short_description: Option<String>,
    #[serde(rename = "precio")]
    pub price: Price,
    /// Filename under `/uploads/`, if the product has an image.
    #[serde(rename = "imagen", default)]
    pub image: Option<String>,
    #[serde(rename = "activo", default)]
    pub visibility: Visibility,
    /// Category names, as joined by the backend.
    #[serde(rename = "categorias", default)]
    pub categories: Vec<String>,
}

/// A product from `GET /api/productos/:id`, including the long description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(flatten)]
    pub summary: ProductSummary,
    #[serde(rename = "descripcion_larga", default)]
    pub long_description: Option<String>,
}

impl Product {
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.summary.id
    }
}

/// A category from `/api/categorias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(rename = "nombre")]
    pub name: String,
    pub slug: String,
}

/// A static content page from `/api/paginas`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: PageId,
    #[serde(rename = "titulo")]
    pub title: String,
    pub slug: String,
    /// Body; only present on the detail endpoint.
    #[serde(rename = "contenido", default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// The authenticated back-office user returned by `POST /api/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
}
