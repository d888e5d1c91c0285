//! Record storage for itemcmp.
//!
//! A product record is the unit of storage, addressed directly by its
//! [`ProductId`](itemcmp_types::ProductId). The store distinguishes creating
//! a record from overwriting one, but knows nothing about owners: ownership
//! is enforced one layer up, by the catalog.
//!
//! # Storage Backends
//!
//! All backends implement the [`RecordStore`] trait:
//!
//! - [`JsonFileStore`] -- one pretty-printed `<id>.json` file per record
//! - [`InMemoryRecordStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. A record either fully exists or does not exist; there are no tombstones.
//! 2. `create` refuses to replace an existing record; `overwrite` always does.
//! 3. Unrelated records never share a file, so writes to one id cannot
//!    clobber another.
//! 4. There is no cross-record atomicity and no locking. `create` checks for
//!    the file and then writes it; concurrent creates of the same id race.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod memory;
pub mod traits;

#[cfg(test)]
mod fixtures;

pub use error::{StoreError, StoreResult};
pub use file::{JsonFileStore, RECORD_EXTENSION};
pub use memory::InMemoryRecordStore;
pub use traits::RecordStore;
