//! Test doubles shared by the panel tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::notify::{BufferedNotifier, Notice};
use crate::store::{Collection, Filter, Order, Record, RecordStore, SqliteStore};

/// In-memory store that counts calls and can be switched offline
pub(crate) struct RecordingStore {
    inner: SqliteStore,
    offline: AtomicBool,
    queries: AtomicUsize,
    inserts: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: SqliteStore::open_memory().unwrap(),
            offline: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        })
    }

    /// Make every following call fail
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Every row in `collection`, bypassing counters and the offline switch
    pub async fn all(&self, collection: Collection) -> Vec<Record> {
        self.inner
            .query(collection, &Filter::new(), Some(&Order::asc("created_at")))
            .await
            .unwrap()
    }

    /// Seed a row, bypassing counters and the offline switch
    pub async fn seed(&self, collection: Collection, record: Record) -> Record {
        self.inner.insert(collection, record).await.unwrap()
    }

    /// Run raw SQL against the backing database
    pub fn exec_sql(&self, sql: &str) {
        self.inner
            .with_db(|db| db.conn().execute(sql, []))
            .unwrap()
            .unwrap();
    }

    fn check(&self, counter: &AtomicUsize) -> StoreResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for RecordingStore {
    async fn query(
        &self,
        collection: Collection,
        filter: &Filter,
        order: Option<&Order>,
    ) -> StoreResult<Vec<Record>> {
        self.check(&self.queries)?;
        self.inner.query(collection, filter, order).await
    }

    async fn insert(&self, collection: Collection, record: Record) -> StoreResult<Record> {
        self.check(&self.inserts)?;
        self.inner.insert(collection, record).await
    }

    async fn update(&self, collection: Collection, id: Uuid, partial: Record) -> StoreResult<()> {
        self.check(&self.updates)?;
        self.inner.update(collection, id, partial).await
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> StoreResult<()> {
        self.check(&self.deletes)?;
        self.inner.delete(collection, id).await
    }
}

pub(crate) fn success(message: &str) -> Notice {
    Notice::Success(message.to_string())
}

pub(crate) fn error(message: &str) -> Notice {
    Notice::Error(message.to_string())
}

/// Store and notifier pair for building a panel
pub(crate) fn harness() -> (Arc<RecordingStore>, Arc<BufferedNotifier>) {
    (RecordingStore::new(), Arc::new(BufferedNotifier::new()))
}
