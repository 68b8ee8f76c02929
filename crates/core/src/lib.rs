//! RocketShoes Core - Shared cart domain types.
//!
//! This crate provides the types shared by every RocketShoes component:
//! - `cart` - Cart store, catalog client and storage backends
//! - `api` - Catalog and stock HTTP service
//! - `cli` - Command-line front end for the cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure transitions - no I/O, no HTTP
//! clients, no storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe product IDs, catalog records, stock entries and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
