//! Catalog service for itemcmp.
//!
//! The catalog is the only component that assigns a record's owner and
//! creation time, and the only one that checks ownership before a record is
//! replaced or removed. It depends on storage solely through the
//! [`RecordStore`](itemcmp_store::RecordStore) trait.
//!
//! Per record the lifecycle is `Absent -> Owned(seller) -> Absent`. Anyone may
//! claim an absent id; only the owner may overwrite or delete it.
//!
//! Batches fail fast and are not rolled back: when the n-th record of a
//! create or update batch fails, records `0..n` stay written.

pub mod clock;
pub mod error;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CatalogError, CatalogResult, ErrorKind, Operation};
pub use service::CatalogService;
