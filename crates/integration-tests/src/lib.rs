//! Integration test support for Tienda.
//!
//! [`MockStore`] runs the store's REST API in-process on an ephemeral port.
//! Tests point a [`tienda_storefront::Shop`] at it and assert on both client
//! state and the requests the mock recorded.
//!
//! Run with: `cargo test -p tienda-integration-tests`

#![cfg_attr(not(test), forbid(unsafe_code))]

mod mock;

pub use mock::{
    ADMIN_EMAIL, ADMIN_ID, ADMIN_PASSWORD, Claims, MockStore, RecordedForm, RecordedRequest,
    SEEDED_IMAGE, SEEDED_IMAGE_BYTES, mint_forged_token, mint_token,
};

use std::path::PathBuf;

use secrecy::SecretString;
use tienda_storefront::session::{FileStorage, MemoryStorage};
use tienda_storefront::{ApiClient, ClientConfig, Shop};

impl MockStore {
    /// Client configuration pointing at this store, persisting state under
    /// `state_dir`.
    #[must_use]
    pub fn config(&self, state_dir: impl Into<PathBuf>) -> ClientConfig {
        let mut config = ClientConfig::new(self.base_url().clone());
        config.state_dir = state_dir.into();
        config
    }

    /// A fresh shop with in-memory session storage.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn shop(&self) -> Shop<MemoryStorage> {
        let api = ApiClient::new(&ClientConfig::new(self.base_url().clone()))
            .expect("failed to build API client");
        Shop::new(api, MemoryStorage::new())
    }

    /// A shop whose session is persisted to a file under `state_dir`, as the
    /// CLI uses it.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn file_shop(&self, state_dir: impl Into<PathBuf>) -> Shop<FileStorage> {
        let config = self.config(state_dir);
        let api = ApiClient::new(&config).expect("failed to build API client");
        Shop::new(api, FileStorage::new(config.session_file()))
    }
}

/// The seeded admin password.
#[must_use]
pub fn admin_password() -> SecretString {
    SecretString::from(ADMIN_PASSWORD)
}

/// A unique scratch directory for persisted client state. Not created.
#[must_use]
pub fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("tienda-state-{}", uuid::Uuid::new_v4()))
}
