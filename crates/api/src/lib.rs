//! RocketShoes catalog service library.
//!
//! Serves product records and stock levels from a JSON data file. Exposed as a
//! library so the router can be mounted in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use catalog::{Catalog, CatalogLoadError};
pub use config::{ApiConfig, ConfigError};
pub use error::AppError;
pub use routes::routes;
pub use state::AppState;
