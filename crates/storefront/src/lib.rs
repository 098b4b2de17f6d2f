//! Tienda Storefront - client-side state and API access for the shop.
//!
//! # Architecture
//!
//! - [`api`] - REST gateway client. Credentials are passed explicitly on every
//!   call; responses are classified into 401/403/5xx errors up front.
//! - [`session`] - Bearer-token session store backed by durable storage.
//! - [`navigation`] - Current route, login redirects and stale-view tickets.
//! - [`views`] - Screen state (`Loadable`, `Screen`) the view layer renders.
//! - [`shop`] - Facade that owns all of the above and applies the
//!   auth-failure protocol.
//!
//! The cart itself lives in `tienda-core` because it never touches I/O.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod navigation;
pub mod session;
pub mod shop;
pub mod views;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use navigation::{Navigator, Route, ViewTicket};
pub use session::{BearerToken, Session, SessionError, SessionStore};
pub use shop::Shop;
pub use views::{Loadable, Screen};
