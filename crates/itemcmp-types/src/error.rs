use thiserror::Error;

use crate::ids::ProductId;

/// Errors produced by type construction and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid product id: {0:?}")]
    InvalidProductId(String),

    #[error("seller id must not be empty")]
    EmptySellerId,

    #[error("invalid product {id}: {reason}")]
    InvalidProduct { id: ProductId, reason: String },
}
