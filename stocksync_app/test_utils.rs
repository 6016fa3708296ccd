#[cfg(any(test, feature = "test-utils"))]
#[cfg(not(tarpaulin_include))]
pub mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::{
        collections::{BTreeMap, HashMap, HashSet},
        sync::{Arc, Mutex},
    };
    use uuid::Uuid;

    use stocksync_types::{
        catalog::{CatalogRecord, RecordKind, ResolvedSku},
        errors::{ApplicationError, CatalogError, DbError},
        pricing::PriceAdjust,
    };

    use crate::{
        jobs::SyncJob,
        repository::{CatalogRepository, OwnerRepository, SettingsRepository, SyncJobRepository},
        uow::{UnitOfWork, UnitOfWorkProvider},
    };

    #[derive(Default, Clone)]
    pub struct MockSyncJobRepository {
        jobs: Arc<Mutex<HashMap<Uuid, (SyncJob, DateTime<Utc>)>>>,
        fail_puts: Arc<Mutex<bool>>,
    }

    impl MockSyncJobRepository {
        pub fn new() -> Self {
            Default::default()
        }

        /// Copy of the stored documents. The failure switch stays shared.
        pub fn snapshot(&self) -> Self {
            Self {
                jobs: Arc::new(Mutex::new(self.jobs.lock().unwrap().clone())),
                fail_puts: self.fail_puts.clone(),
            }
        }

        fn replace_with(&self, other: &Self) {
            let jobs = other.jobs.lock().unwrap().clone();
            *self.jobs.lock().unwrap() = jobs;
        }

        /// Makes every following `put` fail as a database error would.
        pub fn fail_puts(&self, fail: bool) {
            *self.fail_puts.lock().unwrap() = fail;
        }

        pub fn expire(&self, id: Uuid) {
            if let Some(entry) = self.jobs.lock().unwrap().get_mut(&id) {
                entry.1 = Utc::now() - Duration::seconds(1);
            }
        }

        pub fn expires_at(&self, id: Uuid) -> Option<DateTime<Utc>> {
            self.jobs.lock().unwrap().get(&id).map(|(_, at)| *at)
        }

        pub fn len(&self) -> usize {
            self.jobs.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl SyncJobRepository for MockSyncJobRepository {
        async fn put(&self, job: &SyncJob, ttl: Duration) -> Result<(), ApplicationError> {
            if *self.fail_puts.lock().unwrap() {
                return Err(ApplicationError::Db(DbError::Transaction(
                    "job store unavailable".to_string(),
                )));
            }
            self.jobs
                .lock()
                .unwrap()
                .insert(job.id, (job.clone(), Utc::now() + ttl));
            Ok(())
        }

        async fn get(&self, id: Uuid) -> Result<Option<SyncJob>, ApplicationError> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs
                .get(&id)
                .filter(|(_, expires_at)| *expires_at > Utc::now())
                .map(|(job, _)| job.clone()))
        }

        async fn get_for_update(&self, id: Uuid) -> Result<Option<SyncJob>, ApplicationError> {
            self.get(id).await
        }

        async fn delete(&self, id: Uuid) -> Result<(), ApplicationError> {
            self.jobs.lock().unwrap().remove(&id);
            Ok(())
        }

        async fn purge_expired(&self) -> Result<u64, ApplicationError> {
            let mut jobs = self.jobs.lock().unwrap();
            let before = jobs.len();
            let now = Utc::now();
            jobs.retain(|_, (_, expires_at)| *expires_at > now);
            Ok((before - jobs.len()) as u64)
        }
    }

    #[derive(Default, Clone)]
    pub struct MockOwnerRepository {
        pointers: Arc<Mutex<HashMap<Uuid, (Uuid, DateTime<Utc>)>>>,
    }

    impl MockOwnerRepository {
        pub fn new() -> Self {
            Default::default()
        }

        pub fn snapshot(&self) -> Self {
            Self {
                pointers: Arc::new(Mutex::new(self.pointers.lock().unwrap().clone())),
            }
        }

        fn replace_with(&self, other: &Self) {
            let pointers = other.pointers.lock().unwrap().clone();
            *self.pointers.lock().unwrap() = pointers;
        }

        pub fn expire(&self, owner_id: Uuid) {
            if let Some(entry) = self.pointers.lock().unwrap().get_mut(&owner_id) {
                entry.1 = Utc::now() - Duration::seconds(1);
            }
        }
    }

    #[async_trait]
    impl OwnerRepository for MockOwnerRepository {
        async fn remember_last_job(
            &self,
            owner_id: Uuid,
            job_id: Uuid,
            ttl: Duration,
        ) -> Result<(), ApplicationError> {
            self.pointers
                .lock()
                .unwrap()
                .insert(owner_id, (job_id, Utc::now() + ttl));
            Ok(())
        }

        async fn forget_last_job(&self, owner_id: Uuid) -> Result<(), ApplicationError> {
            self.pointers.lock().unwrap().remove(&owner_id);
            Ok(())
        }

        async fn last_job(&self, owner_id: Uuid) -> Result<Option<Uuid>, ApplicationError> {
            let pointers = self.pointers.lock().unwrap();
            Ok(pointers
                .get(&owner_id)
                .filter(|(_, expires_at)| *expires_at > Utc::now())
                .map(|(job_id, _)| *job_id))
        }

        async fn purge_expired(&self) -> Result<u64, ApplicationError> {
            let mut pointers = self.pointers.lock().unwrap();
            let before = pointers.len();
            let now = Utc::now();
            pointers.retain(|_, (_, expires_at)| *expires_at > now);
            Ok((before - pointers.len()) as u64)
        }
    }

    #[derive(Default, Clone)]
    pub struct MockSettingsRepository {
        price_adjust: Arc<Mutex<Option<PriceAdjust>>>,
    }

    impl MockSettingsRepository {
        pub fn new() -> Self {
            Default::default()
        }

        pub fn snapshot(&self) -> Self {
            Self {
                price_adjust: Arc::new(Mutex::new(*self.price_adjust.lock().unwrap())),
            }
        }

        fn replace_with(&self, other: &Self) {
            let adjust = *other.price_adjust.lock().unwrap();
            *self.price_adjust.lock().unwrap() = adjust;
        }
    }

    #[async_trait]
    impl SettingsRepository for MockSettingsRepository {
        async fn load_price_adjust(&self) -> Result<Option<PriceAdjust>, ApplicationError> {
            Ok(*self.price_adjust.lock().unwrap())
        }

        async fn save_price_adjust(&self, adjust: &PriceAdjust) -> Result<(), ApplicationError> {
            *self.price_adjust.lock().unwrap() = Some(*adjust);
            Ok(())
        }
    }

    /// In-memory catalog. Writes are applied immediately, like the real
    /// store, and are never rolled back.
    #[derive(Default, Clone)]
    pub struct MockCatalogRepository {
        records: Arc<Mutex<BTreeMap<i64, CatalogRecord>>>,
        categories: Arc<Mutex<HashMap<i64, Vec<i64>>>>,
        failing_writes: Arc<Mutex<HashSet<i64>>>,
        disconnect_after: Arc<Mutex<Option<usize>>>,
        saves: Arc<Mutex<usize>>,
        resolve_batches: Arc<Mutex<Vec<usize>>>,
    }

    impl MockCatalogRepository {
        pub fn new() -> Self {
            Default::default()
        }

        pub fn add_product(&self, id: i64, sku: &str, category_ids: &[i64]) {
            self.records
                .lock()
                .unwrap()
                .insert(id, CatalogRecord::new(id, sku, RecordKind::Product, 0));
            self.categories
                .lock()
                .unwrap()
                .insert(id, category_ids.to_vec());
        }

        pub fn add_variation(&self, id: i64, sku: &str, parent_id: i64) {
            self.records.lock().unwrap().insert(
                id,
                CatalogRecord::new(id, sku, RecordKind::Variation, parent_id),
            );
        }

        pub fn set_stock(&self, id: i64, quantity: i64) {
            if let Some(record) = self.records.lock().unwrap().get_mut(&id) {
                record.set_managed_stock(true);
                record.set_quantity(quantity);
            }
        }

        pub fn fail_writes_for(&self, id: i64) {
            self.failing_writes.lock().unwrap().insert(id);
        }

        /// Every call fails with a transient error once `saves` records have
        /// been written, until `reconnect`.
        pub fn disconnect_after(&self, saves: usize) {
            *self.disconnect_after.lock().unwrap() = Some(saves);
        }

        pub fn reconnect(&self) {
            *self.disconnect_after.lock().unwrap() = None;
        }

        fn check_connection(&self) -> Result<(), ApplicationError> {
            match *self.disconnect_after.lock().unwrap() {
                Some(limit) if self.saves() >= limit => Err(ApplicationError::Db(
                    DbError::Transaction("catalog connection lost".to_string()),
                )),
                _ => Ok(()),
            }
        }

        pub fn record(&self, id: i64) -> Option<CatalogRecord> {
            self.records.lock().unwrap().get(&id).cloned()
        }

        /// Number of successful record saves.
        pub fn saves(&self) -> usize {
            *self.saves.lock().unwrap()
        }

        /// Size of each SKU batch passed to `resolve_skus`, in call order.
        pub fn resolve_batches(&self) -> Vec<usize> {
            self.resolve_batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CatalogRepository for MockCatalogRepository {
        async fn resolve_skus(
            &self,
            skus: &[String],
        ) -> Result<HashMap<String, ResolvedSku>, ApplicationError> {
            self.check_connection()?;
            self.resolve_batches.lock().unwrap().push(skus.len());
            let records = self.records.lock().unwrap();

            let mut resolved = HashMap::new();
            for sku in skus {
                if let Some(record) = records.values().find(|r| &r.sku == sku) {
                    resolved.insert(
                        sku.clone(),
                        ResolvedSku {
                            record_id: record.id,
                            kind: record.kind,
                            parent_id: record.parent_id,
                        },
                    );
                }
            }
            Ok(resolved)
        }

        async fn get_record(&self, id: i64) -> Result<Option<CatalogRecord>, ApplicationError> {
            self.check_connection()?;
            Ok(self.records.lock().unwrap().get(&id).cloned())
        }

        async fn save_record(&self, record: &CatalogRecord) -> Result<(), ApplicationError> {
            self.check_connection()?;
            if self.failing_writes.lock().unwrap().contains(&record.id) {
                return Err(ApplicationError::Catalog(CatalogError::WriteFailure {
                    id: record.id,
                    reason: "write rejected".to_string(),
                }));
            }
            self.records
                .lock()
                .unwrap()
                .insert(record.id, record.clone());
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }

        async fn list_product_ids_in_categories(
            &self,
            category_ids: &[i64],
            limit: usize,
            offset: usize,
        ) -> Result<Vec<i64>, ApplicationError> {
            self.check_connection()?;
            let records = self.records.lock().unwrap();
            let categories = self.categories.lock().unwrap();

            Ok(records
                .values()
                .filter(|r| r.kind == RecordKind::Product)
                .filter(|r| {
                    categories
                        .get(&r.id)
                        .is_some_and(|cats| cats.iter().any(|c| category_ids.contains(c)))
                })
                .map(|r| r.id)
                .skip(offset)
                .take(limit)
                .collect())
        }

        async fn children_of(&self, id: i64) -> Result<Vec<i64>, ApplicationError> {
            self.check_connection()?;
            let records = self.records.lock().unwrap();
            Ok(records
                .values()
                .filter(|r| r.kind == RecordKind::Variation && r.parent_id == id)
                .map(|r| r.id)
                .collect())
        }
    }

    /// Committed state shared by every unit of work of a provider.
    #[derive(Default, Clone)]
    pub struct MockStore {
        pub sync_jobs: MockSyncJobRepository,
        pub owners: MockOwnerRepository,
        pub settings: MockSettingsRepository,
        pub catalog: MockCatalogRepository,
    }

    impl MockStore {
        pub fn new() -> Self {
            Default::default()
        }
    }

    #[derive(Default)]
    pub struct MockUnitOfWork {
        sync_jobs: Arc<MockSyncJobRepository>,
        owners: Arc<MockOwnerRepository>,
        settings: Arc<MockSettingsRepository>,
        catalog: Arc<MockCatalogRepository>,
        store: Option<MockStore>,

        // Flags to check if commit/rollback was called
        committed: Arc<Mutex<bool>>,
        rolled_back: Arc<Mutex<bool>>,
    }

    impl MockUnitOfWork {
        pub fn new() -> Self {
            Default::default()
        }

        /// Works on copies of the store's job, owner and settings data and
        /// writes them back on commit. The catalog is shared as is.
        pub fn with_store(store: &MockStore) -> Self {
            Self {
                sync_jobs: Arc::new(store.sync_jobs.snapshot()),
                owners: Arc::new(store.owners.snapshot()),
                settings: Arc::new(store.settings.snapshot()),
                catalog: Arc::new(store.catalog.clone()),
                store: Some(store.clone()),
                ..Default::default()
            }
        }

        pub fn committed(&self) -> Arc<Mutex<bool>> {
            self.committed.clone()
        }

        pub fn rolled_back(&self) -> Arc<Mutex<bool>> {
            self.rolled_back.clone()
        }
    }

    #[async_trait]
    impl<'a> UnitOfWork<'a> for MockUnitOfWork {
        fn sync_jobs(&self) -> Arc<dyn SyncJobRepository + 'a> {
            self.sync_jobs.clone()
        }

        fn owners(&self) -> Arc<dyn OwnerRepository + 'a> {
            self.owners.clone()
        }

        fn settings(&self) -> Arc<dyn SettingsRepository + 'a> {
            self.settings.clone()
        }

        fn catalog(&self) -> Arc<dyn CatalogRepository + 'a> {
            self.catalog.clone()
        }

        async fn commit(self: Box<Self>) -> Result<(), ApplicationError> {
            if let Some(store) = &self.store {
                store.sync_jobs.replace_with(&self.sync_jobs);
                store.owners.replace_with(&self.owners);
                store.settings.replace_with(&self.settings);
            }
            *self.committed.lock().unwrap() = true;
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<(), ApplicationError> {
            *self.rolled_back.lock().unwrap() = true;
            Ok(())
        }
    }

    #[derive(Default, Clone)]
    pub struct MockUnitOfWorkProvider {
        store: MockStore,
    }

    impl MockUnitOfWorkProvider {
        pub fn new() -> Self {
            Default::default()
        }

        pub fn with_store(store: MockStore) -> Self {
            Self { store }
        }

        pub fn store(&self) -> &MockStore {
            &self.store
        }
    }

    #[async_trait]
    impl UnitOfWorkProvider for MockUnitOfWorkProvider {
        async fn tx<'p>(&'p self) -> Result<Box<dyn UnitOfWork<'p> + 'p>, ApplicationError> {
            let uow: Box<dyn UnitOfWork<'_> + '_> = Box::new(MockUnitOfWork::with_store(&self.store));
            Ok(uow)
        }
    }
}
