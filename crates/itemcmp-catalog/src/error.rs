use std::fmt;

use itemcmp_store::StoreError;
use itemcmp_types::{ProductId, SellerId, TypeError};
use thiserror::Error;

/// The catalog operation an error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Create,
    Update,
    Compare,
    Get,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Compare => "compare",
            Self::Get => "get",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Coarse classification of a [`CatalogError`], for callers that map
/// failures onto their own status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    Unauthorized,
    Invalid,
    Storage,
}

/// Errors returned by the catalog service.
///
/// Every variant names the operation that failed and, where one applies, the
/// product id, so callers can log without re-deriving context.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{op}: product {id} not found")]
    NotFound { op: Operation, id: ProductId },

    #[error("{op}: product {id} already exists")]
    AlreadyExists { op: Operation, id: ProductId },

    #[error("{op}: seller {seller} does not own product {id}")]
    Unauthorized {
        op: Operation,
        id: ProductId,
        seller: SellerId,
    },

    #[error("{op}: {source}")]
    Invalid {
        op: Operation,
        #[source]
        source: TypeError,
    },

    #[error("{op} failed{}: {source}", for_product(.id))]
    Storage {
        op: Operation,
        id: Option<ProductId>,
        #[source]
        source: StoreError,
    },
}

fn for_product(id: &Option<ProductId>) -> String {
    id.map(|id| format!(" for product {id}")).unwrap_or_default()
}

impl CatalogError {
    /// Attach operation context to a store error.
    ///
    /// Record-level outcomes keep their own variants; anything else becomes
    /// [`CatalogError::Storage`] with the store error as its source.
    pub fn from_store(op: Operation, id: Option<ProductId>, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound { op, id },
            StoreError::AlreadyExists(id) => Self::AlreadyExists { op, id },
            source => Self::Storage { op, id, source },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Invalid { .. } => ErrorKind::Invalid,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::NotFound { op, .. }
            | Self::AlreadyExists { op, .. }
            | Self::Unauthorized { op, .. }
            | Self::Invalid { op, .. }
            | Self::Storage { op, .. } => *op,
        }
    }
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
