//! Foundation types for itemcmp.
//!
//! Every other itemcmp crate depends on `itemcmp-types`. The types here are
//! plain data: they carry no storage or authorization logic.
//!
//! # Key Types
//!
//! - [`ProductId`] -- Caller-supplied integer primary key
//! - [`SellerId`] -- Opaque owner tag, never empty
//! - [`ProductDraft`] -- The fields a caller may supply for a listing
//! - [`Product`] -- A stored listing, including the owner and creation stamp

pub mod error;
pub mod ids;
pub mod product;

pub use error::TypeError;
pub use ids::{ProductId, SellerId};
pub use product::{Product, ProductDraft};
