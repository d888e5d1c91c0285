//! HTTP server for itemcmp.
//!
//! Exposes the catalog as a small JSON REST API under `/api/v1`. The seller
//! making a change is identified by the `x-seller-id` request header; the
//! server does not authenticate it.

pub mod config;
pub mod dto;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use dto::{CompareRequest, HealthResponse, ProductResponse};
pub use error::{ApiError, ServerError, ServerResult};
pub use handler::{AppState, SELLER_HEADER};
pub use server::CatalogServer;
