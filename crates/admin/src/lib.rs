//! Tienda Admin - back-office operations over the store API.
//!
//! Everything here needs an authenticated session. Requests go through the
//! storefront's [`tienda_storefront::Shop`], so a rejected token during an
//! admin operation logs the user out and lands on the login screen exactly
//! as it does in the browser.
//!
//! # Modules
//!
//! - [`api`] - Credentialed write endpoints (multipart products, JSON categories)
//! - [`form`] - Product and category editor state
//! - [`slug`] - URL slug generation
//! - [`stats`] - Dashboard totals
//! - [`console`] - [`AdminConsole`], the entry point tying these together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod console;
pub mod error;
pub mod form;
pub mod slug;
pub mod stats;

pub use api::AdminApi;
pub use console::AdminConsole;
pub use error::{AdminError, FormError};
pub use form::{CategoryForm, ImageUpload, ProductForm};
pub use slug::slugify;
pub use stats::DashboardStats;
