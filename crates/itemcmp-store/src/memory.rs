use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::RwLock;

use itemcmp_types::{Product, ProductId};

use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

/// In-memory, `BTreeMap`-based record store.
///
/// Intended for tests and embedding. Records are held behind a `RwLock` and
/// cloned on read and write. Unlike [`JsonFileStore`](crate::JsonFileStore),
/// `create` here checks and inserts under one write lock.
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a store pre-populated with `products`. Later duplicates win.
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let records = products.into_iter().map(|p| (p.id, p)).collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn load_all(&self) -> StoreResult<Vec<Product>> {
        let map = self.records.read().expect("lock poisoned");
        Ok(map.values().cloned().collect())
    }

    fn create(&self, product: &Product) -> StoreResult<()> {
        let mut map = self.records.write().expect("lock poisoned");
        match map.entry(product.id) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(product.id)),
            Entry::Vacant(slot) => {
                slot.insert(product.clone());
                Ok(())
            }
        }
    }

    fn overwrite(&self, product: &Product) -> StoreResult<()> {
        let mut map = self.records.write().expect("lock poisoned");
        map.insert(product.id, product.clone());
        Ok(())
    }

    fn get(&self, id: ProductId) -> StoreResult<Product> {
        let map = self.records.read().expect("lock poisoned");
        map.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn delete(&self, id: ProductId) -> StoreResult<()> {
        let mut map = self.records.write().expect("lock poisoned");
        map.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecordStore")
            .field("record_count", &self.len())
            .finish()
    }
}
