use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use itemcmp_types::{Product, ProductId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

/// File extension of record files. Files with any other extension in the
/// storage directory are ignored.
pub const RECORD_EXTENSION: &str = "json";

/// File-per-record store.
///
/// Each product lives at `<root>/<id>.json` as pretty-printed JSON. The root
/// directory is fixed at construction and is expected to exist; only
/// [`load_all`](RecordStore::load_all) tolerates its absence.
///
/// There is no locking. Operations on different ids never touch the same
/// file, but two writers racing on one id are not coordinated.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at the given directory. Nothing is touched on
    /// disk until the first operation.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding the record for `id`.
    pub fn record_path(&self, id: ProductId) -> PathBuf {
        self.root.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    /// Create the storage directory (and parents) if it does not exist.
    pub fn ensure_root(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))
    }

    fn read_record(path: &Path) -> StoreResult<Product> {
        let bytes = fs::read(path).map_err(|e| StoreError::io(path, e))?;
        Self::decode(path, &bytes)
    }

    fn decode(path: &Path, bytes: &[u8]) -> StoreResult<Product> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::serialization(path, e))
    }

    fn write_record(path: &Path, product: &Product) -> StoreResult<()> {
        let bytes =
            serde_json::to_vec_pretty(product).map_err(|e| StoreError::serialization(path, e))?;
        fs::write(path, bytes).map_err(|e| StoreError::io(path, e))?;
        debug!(id = %product.id, path = %path.display(), "record written");
        Ok(())
    }

    fn is_record_file(path: &Path) -> bool {
        path.extension().and_then(|ext| ext.to_str()) == Some(RECORD_EXTENSION)
    }
}

impl RecordStore for JsonFileStore {
    fn load_all(&self) -> StoreResult<Vec<Product>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(root = %self.root.display(), "storage directory missing; no records");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };

        let mut products = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| StoreError::io(&path, e))?;
            if file_type.is_dir() || !Self::is_record_file(&path) {
                continue;
            }
            // One bad file fails the whole listing.
            products.push(Self::read_record(&path)?);
        }

        products.sort_by_key(|p| p.id);
        debug!(root = %self.root.display(), count = products.len(), "records loaded");
        Ok(products)
    }

    fn create(&self, product: &Product) -> StoreResult<()> {
        let path = self.record_path(product.id);
        // The existence check and the write are two separate syscalls.
        let exists = path.try_exists().map_err(|e| StoreError::io(&path, e))?;
        if exists {
            return Err(StoreError::AlreadyExists(product.id));
        }
        Self::write_record(&path, product)
    }

    fn overwrite(&self, product: &Product) -> StoreResult<()> {
        Self::write_record(&self.record_path(product.id), product)
    }

    fn get(&self, id: ProductId) -> StoreResult<Product> {
        let path = self.record_path(id);
        match fs::read(&path) {
            Ok(bytes) => Self::decode(&path, &bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(id)),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn delete(&self, id: ProductId) -> StoreResult<()> {
        let path = self.record_path(id);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(%id, path = %path.display(), "record deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(id)),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}
