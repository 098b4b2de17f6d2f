//! Error types for back-office operations.

use thiserror::Error;
use tienda_storefront::ApiError;

/// An editor form that cannot be submitted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("name is required")]
    MissingName,

    #[error("slug is required")]
    MissingSlug,

    #[error("invalid price {0:?}: expected a non-negative amount")]
    InvalidPrice(String),
}

/// Error returned by [`crate::AdminConsole`] operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No active session, or it was dropped during the operation.
    #[error("not logged in")]
    NotLoggedIn,

    /// The form failed validation; nothing was sent.
    #[error("invalid form: {0}")]
    Form(#[from] FormError),

    /// The API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AdminError {
    /// `true` when the user has to log in (again) before retrying.
    #[must_use]
    pub const fn needs_login(&self) -> bool {
        match self {
            Self::NotLoggedIn => true,
            Self::Api(e) => e.is_unauthorized(),
            Self::Form(_) => false,
        }
    }
}
