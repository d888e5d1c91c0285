use std::sync::Arc;

use itemcmp_store::{RecordStore, StoreError, StoreResult};
use itemcmp_types::{Product, ProductDraft, ProductId, SellerId};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{CatalogError, CatalogResult, Operation};

/// Ownership-enforcing facade over a [`RecordStore`].
///
/// This is the entire surface a transport may call. It assigns `seller_id`
/// and `created_at`; neither is ever taken from caller input.
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl CatalogService {
    /// Create a service stamping records with wall-clock time.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// All stored records, ordered by id.
    pub fn list_all(&self) -> CatalogResult<Vec<Product>> {
        let products = self
            .store
            .load_all()
            .map_err(|e| CatalogError::from_store(Operation::List, None, e))?;
        debug!(count = products.len(), "listed products");
        Ok(products)
    }

    /// Create every draft as a new record owned by `seller`.
    ///
    /// All drafts are validated before anything is written, and the whole
    /// batch shares one `created_at`. Records are created in input order; the
    /// first failure (e.g. a duplicate id) aborts the batch without undoing
    /// the records already created.
    pub fn create_many(
        &self,
        drafts: Vec<ProductDraft>,
        seller: &SellerId,
    ) -> CatalogResult<Vec<Product>> {
        validate_all(Operation::Create, &drafts)?;

        let created_at = self.clock.now();
        let products: Vec<Product> = drafts
            .into_iter()
            .map(|draft| Product::from_draft(draft, seller.clone(), created_at))
            .collect();

        self.write_batch(Operation::Create, &products, |store, p| store.create(p))?;
        info!(%seller, count = products.len(), "products created");
        Ok(products)
    }

    /// Replace or create each draft's record on behalf of `seller`.
    ///
    /// Every id is resolved before anything is written:
    /// - absent: the record is created, owned by `seller`, stamped now;
    /// - owned by another seller: the whole batch fails with `Unauthorized`
    ///   and nothing is written;
    /// - owned by `seller`: the stored owner and `created_at` are carried over.
    ///
    /// Writes then happen in input order, failing fast without rollback.
    pub fn update_many(
        &self,
        drafts: Vec<ProductDraft>,
        seller: &SellerId,
    ) -> CatalogResult<Vec<Product>> {
        validate_all(Operation::Update, &drafts)?;

        let now = self.clock.now();
        let mut resolved = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = draft.id;
            let product = match self.store.get(id) {
                Ok(existing) if !existing.is_owned_by(seller) => {
                    warn!(%id, %seller, owner = %existing.seller_id, "update denied");
                    return Err(CatalogError::Unauthorized {
                        op: Operation::Update,
                        id,
                        seller: seller.clone(),
                    });
                }
                Ok(existing) => Product::from_draft(draft, existing.seller_id, existing.created_at),
                Err(StoreError::NotFound(_)) => Product::from_draft(draft, seller.clone(), now),
                Err(e) => return Err(CatalogError::from_store(Operation::Update, Some(id), e)),
            };
            resolved.push(product);
        }

        self.write_batch(Operation::Update, &resolved, |store, p| store.overwrite(p))?;
        info!(%seller, count = resolved.len(), "products updated");
        Ok(resolved)
    }

    /// Fetch several records in the requested order. Fails on the first
    /// missing or unreadable id, naming that id.
    pub fn compare_by_ids(&self, ids: &[ProductId]) -> CatalogResult<Vec<Product>> {
        ids.iter()
            .map(|&id| {
                self.store
                    .get(id)
                    .map_err(|e| CatalogError::from_store(Operation::Compare, Some(id), e))
            })
            .collect()
    }

    pub fn get_by_id(&self, id: ProductId) -> CatalogResult<Product> {
        self.store
            .get(id)
            .map_err(|e| CatalogError::from_store(Operation::Get, Some(id), e))
    }

    /// Delete a record owned by `seller`.
    pub fn delete_by_id(&self, id: ProductId, seller: &SellerId) -> CatalogResult<()> {
        let existing = self
            .store
            .get(id)
            .map_err(|e| CatalogError::from_store(Operation::Delete, Some(id), e))?;

        if !existing.is_owned_by(seller) {
            warn!(%id, %seller, owner = %existing.seller_id, "delete denied");
            return Err(CatalogError::Unauthorized {
                op: Operation::Delete,
                id,
                seller: seller.clone(),
            });
        }

        self.store
            .delete(id)
            .map_err(|e| CatalogError::from_store(Operation::Delete, Some(id), e))?;
        info!(%id, %seller, "product deleted");
        Ok(())
    }

    fn write_batch<F>(&self, op: Operation, products: &[Product], write: F) -> CatalogResult<()>
    where
        F: Fn(&dyn RecordStore, &Product) -> StoreResult<()>,
    {
        for (applied, product) in products.iter().enumerate() {
            if let Err(e) = write(self.store.as_ref(), product) {
                warn!(
                    %op,
                    id = %product.id,
                    applied,
                    total = products.len(),
                    "batch aborted; records already written are kept"
                );
                return Err(CatalogError::from_store(op, Some(product.id), e));
            }
        }
        Ok(())
    }
}

fn validate_all(op: Operation, drafts: &[ProductDraft]) -> CatalogResult<()> {
    drafts
        .iter()
        .try_for_each(|d| d.validate())
        .map_err(|source| CatalogError::Invalid { op, source })
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use itemcmp_store::{InMemoryRecordStore, JsonFileStore};
    use rust_decimal::Decimal;

    use super::*;
    use crate::clock::FixedClock;
    use crate::error::ErrorKind;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn seller(name: &str) -> SellerId {
        SellerId::new(name).unwrap()
    }

    fn draft(id: i64) -> ProductDraft {
        let mut d = ProductDraft::new(id, format!("Item {id}"), Decimal::new(1000 + id, 2));
        d.specifications.insert("size".into(), "M".into());
        d
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id.get()).collect()
    }

    /// Run `test` once against the in-memory store and once against a
    /// file store in a fresh temporary directory.
    fn with_backends(test: impl Fn(&CatalogService, &FixedClock)) {
        let clock = Arc::new(FixedClock::new(t0()));
        let memory: Arc<dyn RecordStore> = Arc::new(InMemoryRecordStore::new());
        test(&CatalogService::with_clock(memory, clock.clone()), &clock);

        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(FixedClock::new(t0()));
        let files: Arc<dyn RecordStore> = Arc::new(JsonFileStore::new(dir.path()));
        test(&CatalogService::with_clock(files, clock.clone()), &clock);
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    #[test]
    fn create_then_get_roundtrip() {
        with_backends(|svc, _| {
            let owner = seller("acme");
            svc.create_many(vec![draft(1)], &owner).unwrap();

            let stored = svc.get_by_id(ProductId::new(1)).unwrap();
            assert_eq!(stored.to_draft(), draft(1));
            assert_eq!(stored.seller_id, owner);
            assert_eq!(stored.created_at, t0());
        });
    }

    #[test]
    fn create_batch_shares_one_timestamp() {
        with_backends(|svc, _| {
            let created = svc
                .create_many(vec![draft(1), draft(2), draft(3)], &seller("acme"))
                .unwrap();
            assert_eq!(ids(&created), vec![1, 2, 3]);
            assert!(created.iter().all(|p| p.created_at == t0()));
        });
    }

    #[test]
    fn duplicate_create_is_rejected_and_first_is_kept() {
        with_backends(|svc, clock| {
            svc.create_many(vec![draft(1)], &seller("acme")).unwrap();
            let first = svc.get_by_id(ProductId::new(1)).unwrap();

            clock.advance(Duration::minutes(5));
            let mut again = draft(1);
            again.name = "Replacement".into();
            let err = svc.create_many(vec![again], &seller("other")).unwrap_err();

            assert_eq!(err.kind(), ErrorKind::AlreadyExists);
            assert!(matches!(err, CatalogError::AlreadyExists { id, .. } if id == ProductId::new(1)));
            assert_eq!(svc.get_by_id(ProductId::new(1)).unwrap(), first);
        });
    }

    #[test]
    fn create_batch_failure_keeps_written_prefix() {
        with_backends(|svc, _| {
            svc.create_many(vec![draft(2)], &seller("acme")).unwrap();

            let err = svc
                .create_many(vec![draft(1), draft(2), draft(3)], &seller("acme"))
                .unwrap_err();
            assert!(matches!(err, CatalogError::AlreadyExists { id, .. } if id == ProductId::new(2)));

            assert_eq!(ids(&svc.list_all().unwrap()), vec![1, 2]);
        });
    }

    #[test]
    fn invalid_draft_blocks_whole_batch() {
        with_backends(|svc, _| {
            let mut bad = draft(2);
            bad.price = Decimal::ZERO;
            let err = svc
                .create_many(vec![draft(1), bad], &seller("acme"))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Invalid);
            assert!(svc.list_all().unwrap().is_empty());
        });
    }

    #[test]
    fn price_beyond_float_precision_is_invalid() {
        with_backends(|svc, _| {
            let mut precise = draft(2);
            precise.price = "1234567.123456789012345".parse().unwrap();
            let err = svc
                .create_many(vec![draft(1), precise.clone()], &seller("acme"))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Invalid);

            let err = svc.update_many(vec![precise], &seller("acme")).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Invalid);
            assert!(svc.list_all().unwrap().is_empty());
        });
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    #[test]
    fn invalid_draft_blocks_whole_update() {
        with_backends(|svc, _| {
            let owner = seller("acme");
            svc.create_many(vec![draft(1)], &owner).unwrap();
            let before = svc.list_all().unwrap();

            let mut renamed = draft(1);
            renamed.name = "Renamed".into();
            let mut bad = draft(2);
            bad.name = "   ".into();
            let err = svc.update_many(vec![renamed, bad], &owner).unwrap_err();

            assert!(matches!(err, CatalogError::Invalid { op: Operation::Update, .. }));
            assert_eq!(svc.list_all().unwrap(), before);
        });
    }

    #[test]
    fn update_of_absent_id_creates_it() {
        with_backends(|svc, clock| {
            clock.advance(Duration::hours(1));
            svc.update_many(vec![draft(5)], &seller("acme")).unwrap();

            let stored = svc.get_by_id(ProductId::new(5)).unwrap();
            assert_eq!(stored.seller_id, seller("acme"));
            assert_eq!(stored.created_at, t0() + Duration::hours(1));
        });
    }

    #[test]
    fn update_by_owner_keeps_owner_and_created_at() {
        with_backends(|svc, clock| {
            let owner = seller("acme");
            svc.create_many(vec![draft(1)], &owner).unwrap();

            clock.advance(Duration::days(3));
            let mut changed = draft(1);
            changed.name = "Item 1 v2".into();
            changed.price = Decimal::new(4999, 2);
            svc.update_many(vec![changed.clone()], &owner).unwrap();

            let stored = svc.get_by_id(ProductId::new(1)).unwrap();
            assert_eq!(stored.to_draft(), changed);
            assert_eq!(stored.seller_id, owner);
            assert_eq!(stored.created_at, t0());
        });
    }

    #[test]
    fn update_by_other_seller_is_unauthorized_and_changes_nothing() {
        with_backends(|svc, _| {
            let owner = seller("acme");
            svc.create_many(vec![draft(1), draft(2)], &owner).unwrap();
            let before = svc.list_all().unwrap();

            let mut mine = draft(1);
            mine.name = "mine".into();
            let mut theirs = draft(2);
            theirs.name = "hijacked".into();
            svc.create_many(vec![draft(3)], &seller("mallory")).unwrap();

            // Batch by mallory: first id is acme's, so nothing is written.
            let err = svc
                .update_many(vec![theirs, draft(3)], &seller("mallory"))
                .unwrap_err();
            assert!(matches!(
                &err,
                CatalogError::Unauthorized { id, seller: s, .. }
                    if *id == ProductId::new(2) && s.as_str() == "mallory"
            ));

            // Batch by acme touching mallory's record: acme's own record is untouched too.
            let err = svc
                .update_many(vec![mine, draft(3)], &owner)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthorized);

            let after = svc.list_all().unwrap();
            assert_eq!(&after[..2], &before[..]);
            assert_eq!(after[2].seller_id, seller("mallory"));
        });
    }

    #[test]
    fn update_batch_mixes_new_and_owned_records() {
        with_backends(|svc, clock| {
            let owner = seller("acme");
            svc.create_many(vec![draft(1)], &owner).unwrap();
            clock.advance(Duration::hours(2));

            let updated = svc.update_many(vec![draft(1), draft(2)], &owner).unwrap();
            assert_eq!(updated[0].created_at, t0());
            assert_eq!(updated[1].created_at, t0() + Duration::hours(2));
            assert_eq!(ids(&svc.list_all().unwrap()), vec![1, 2]);
        });
    }

    // -----------------------------------------------------------------------
    // Read / compare
    // -----------------------------------------------------------------------

    #[test]
    fn get_missing_is_not_found() {
        with_backends(|svc, _| {
            let err = svc.get_by_id(ProductId::new(999)).unwrap_err();
            assert!(matches!(
                err,
                CatalogError::NotFound { op: Operation::Get, id } if id == ProductId::new(999)
            ));
        });
    }

    #[test]
    fn repeated_reads_are_identical() {
        with_backends(|svc, _| {
            svc.create_many(vec![draft(1)], &seller("acme")).unwrap();
            let a = svc.get_by_id(ProductId::new(1)).unwrap();
            let b = svc.get_by_id(ProductId::new(1)).unwrap();
            assert_eq!(a, b);
        });
    }

    #[test]
    fn compare_preserves_requested_order() {
        with_backends(|svc, _| {
            svc.create_many(vec![draft(1), draft(2), draft(3)], &seller("acme"))
                .unwrap();
            let got = svc.compare_by_ids(&[3, 1, 2].map(ProductId::new)).unwrap();
            assert_eq!(ids(&got), vec![3, 1, 2]);
        });
    }

    #[test]
    fn compare_with_missing_id_fails() {
        with_backends(|svc, _| {
            svc.create_many(vec![draft(1)], &seller("acme")).unwrap();
            let err = svc
                .compare_by_ids(&[ProductId::new(1), ProductId::new(42)])
                .unwrap_err();
            assert!(matches!(
                err,
                CatalogError::NotFound { op: Operation::Compare, id } if id == ProductId::new(42)
            ));
        });
    }

    #[test]
    fn list_all_starts_empty() {
        with_backends(|svc, _| {
            assert!(svc.list_all().unwrap().is_empty());
        });
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    #[test]
    fn owner_can_delete() {
        with_backends(|svc, _| {
            let owner = seller("acme");
            svc.create_many(vec![draft(1)], &owner).unwrap();
            svc.delete_by_id(ProductId::new(1), &owner).unwrap();
            assert_eq!(
                svc.get_by_id(ProductId::new(1)).unwrap_err().kind(),
                ErrorKind::NotFound
            );
        });
    }

    #[test]
    fn delete_by_other_seller_is_unauthorized() {
        with_backends(|svc, _| {
            svc.create_many(vec![draft(1)], &seller("acme")).unwrap();
            let before = svc.get_by_id(ProductId::new(1)).unwrap();

            let err = svc
                .delete_by_id(ProductId::new(1), &seller("mallory"))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthorized);
            assert_eq!(svc.get_by_id(ProductId::new(1)).unwrap(), before);
        });
    }

    #[test]
    fn delete_missing_is_not_found() {
        with_backends(|svc, _| {
            let err = svc
                .delete_by_id(ProductId::new(999), &seller("any"))
                .unwrap_err();
            assert!(matches!(
                err,
                CatalogError::NotFound { op: Operation::Delete, .. }
            ));
        });
    }

    #[test]
    fn deleted_id_can_be_claimed_again() {
        with_backends(|svc, clock| {
            svc.create_many(vec![draft(1)], &seller("acme")).unwrap();
            svc.delete_by_id(ProductId::new(1), &seller("acme")).unwrap();

            clock.advance(Duration::days(1));
            svc.create_many(vec![draft(1)], &seller("globex")).unwrap();
            let stored = svc.get_by_id(ProductId::new(1)).unwrap();
            assert_eq!(stored.seller_id, seller("globex"));
            assert_eq!(stored.created_at, t0() + Duration::days(1));
        });
    }

    // -----------------------------------------------------------------------
    // Storage failures
    // -----------------------------------------------------------------------

    /// Delegates to an in-memory store but fails every overwrite of one id.
    struct FailingOverwrite {
        inner: InMemoryRecordStore,
        fail_on: ProductId,
    }

    impl RecordStore for FailingOverwrite {
        fn load_all(&self) -> StoreResult<Vec<Product>> {
            self.inner.load_all()
        }
        fn create(&self, product: &Product) -> StoreResult<()> {
            self.inner.create(product)
        }
        fn overwrite(&self, product: &Product) -> StoreResult<()> {
            if product.id == self.fail_on {
                return Err(StoreError::Io {
                    path: PathBuf::from(format!("{}.json", product.id)),
                    source: io::Error::new(io::ErrorKind::Other, "disk full"),
                });
            }
            self.inner.overwrite(product)
        }
        fn get(&self, id: ProductId) -> StoreResult<Product> {
            self.inner.get(id)
        }
        fn delete(&self, id: ProductId) -> StoreResult<()> {
            self.inner.delete(id)
        }
    }

    #[test]
    fn update_storage_failure_keeps_prefix_and_names_record() {
        let store = Arc::new(FailingOverwrite {
            inner: InMemoryRecordStore::new(),
            fail_on: ProductId::new(2),
        });
        let svc = CatalogService::with_clock(store.clone(), Arc::new(FixedClock::new(t0())));

        let err = svc
            .update_many(vec![draft(1), draft(2), draft(3)], &seller("acme"))
            .unwrap_err();
        assert!(matches!(
            &err,
            CatalogError::Storage { op: Operation::Update, id: Some(id), .. } if *id == ProductId::new(2)
        ));
        assert!(err.to_string().contains("disk full"));
        assert_eq!(ids(&store.inner.load_all().unwrap()), vec![1]);
    }

    #[test]
    fn update_aborts_on_unreadable_record_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2.json"), "{ truncated").unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path()));
        let svc = CatalogService::with_clock(store.clone(), Arc::new(FixedClock::new(t0())));

        let err = svc
            .update_many(vec![draft(1), draft(2)], &seller("acme"))
            .unwrap_err();
        assert!(matches!(
            &err,
            CatalogError::Storage { op: Operation::Update, id: Some(id), .. } if *id == ProductId::new(2)
        ));
        assert!(!store.record_path(ProductId::new(1)).exists());
    }

    #[test]
    fn compare_names_unreadable_record() {
        let dir = tempfile::tempdir().unwrap();
        let svc = CatalogService::with_clock(
            Arc::new(JsonFileStore::new(dir.path())),
            Arc::new(FixedClock::new(t0())),
        );
        svc.create_many(vec![draft(1)], &seller("acme")).unwrap();
        std::fs::write(dir.path().join("3.json"), "not json").unwrap();

        let err = svc
            .compare_by_ids(&[ProductId::new(1), ProductId::new(3)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(matches!(
            &err,
            CatalogError::Storage { op: Operation::Compare, id: Some(id), .. } if *id == ProductId::new(3)
        ));
        assert!(err.to_string().starts_with("compare failed for product 3: "));
    }

    #[test]
    fn corrupt_file_fails_listing_as_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("1.json"), "garbage").unwrap();
        let svc = CatalogService::new(Arc::new(JsonFileStore::new(dir.path())));

        let err = svc.list_all().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.operation(), Operation::List);
    }
}
