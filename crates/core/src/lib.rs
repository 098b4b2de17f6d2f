//! Tienda Core - Shared types and client-side cart state.
//!
//! This crate provides the types used across all Tienda components:
//! - `storefront` - API gateway client, session store and shop facade
//! - `admin` - Back-office API bindings and dashboard stats
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure state containers - no I/O, no
//! HTTP clients, no persistence. The cart lives here because it is never
//! persisted and never talks to the network.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and visibility
//! - [`catalog`] - Products, categories and pages as served by the API
//! - [`cart`] - The in-memory cart store

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{Cart, CartLine, QuantitySelector};
pub use catalog::{Category, Page, Product, ProductSummary, User};
pub use types::*;
