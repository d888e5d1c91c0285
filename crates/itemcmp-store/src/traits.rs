use itemcmp_types::{Product, ProductId};

use crate::error::StoreResult;

/// Durable key-value storage of product records, keyed by id.
///
/// All implementations must satisfy these invariants:
/// - `create` fails with `AlreadyExists` when a record for the id is present
///   and leaves that record untouched.
/// - `overwrite` never checks for existence; it is only called after the
///   caller has resolved ownership.
/// - `get` and `delete` report `NotFound` exactly when no record exists.
/// - Enumeration and batch reads never return partial results: the first
///   failure aborts the whole call.
pub trait RecordStore: Send + Sync {
    /// Return every stored record, ordered by id.
    ///
    /// An uninitialized store (e.g. a missing directory) yields an empty list.
    fn load_all(&self) -> StoreResult<Vec<Product>>;

    /// Store a new record. Fails with `AlreadyExists` if the id is taken.
    fn create(&self, product: &Product) -> StoreResult<()>;

    /// Store a record, replacing any existing record with the same id.
    fn overwrite(&self, product: &Product) -> StoreResult<()>;

    /// Read the record for `id`.
    fn get(&self, id: ProductId) -> StoreResult<Product>;

    /// Remove the record for `id`.
    fn delete(&self, id: ProductId) -> StoreResult<()>;

    /// Read several records, preserving the requested order.
    ///
    /// Fails fast on the first missing or unreadable id. Callers that want a
    /// best-effort comparison must filter the ids beforehand.
    fn compare(&self, ids: &[ProductId]) -> StoreResult<Vec<Product>> {
        ids.iter().map(|id| self.get(*id)).collect()
    }
}
