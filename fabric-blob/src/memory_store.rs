use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use fabric_core::AssetKey;
use parking_lot::RwLock;

use crate::store::{join_url, object_file_name};
use crate::{BackendKind, MediaError, MediaResult, ReplicaStore};

/// In-process replica store for tests and local development.
///
/// Failures can be injected per operation and every call is counted, so
/// callers can assert how many times a backend was reached.
#[derive(Debug)]
pub struct MemoryStore {
    kind: BackendKind,
    base_url: String,
    objects: RwLock<HashMap<AssetKey, Bytes>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    latency: RwLock<Option<Duration>>,
    upload_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            base_url: format!("memory://{}", kind),
            objects: RwLock::new(HashMap::new()),
            fail_uploads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            latency: RwLock::new(None),
            upload_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub fn object_store() -> Self {
        Self::new(BackendKind::ObjectStore)
    }

    pub fn file_transfer() -> Self {
        Self::new(BackendKind::FileTransfer)
    }

    /// Make every following upload fail (or succeed again)
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make every following delete fail (or succeed again)
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Delay every operation, to simulate a slow network
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    pub fn contains(&self, key: &AssetKey) -> bool {
        self.objects.read().contains_key(key)
    }

    pub fn get(&self, key: &AssetKey) -> Option<Bytes> {
        self.objects.read().get(key).cloned()
    }

    /// Insert an object directly, bypassing call counting
    pub fn seed(&self, key: AssetKey, bytes: Bytes) {
        self.objects.write().insert(key, bytes);
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ReplicaStore for MemoryStore {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn upload(&self, bytes: Bytes, key: &AssetKey) -> MediaResult<String> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(MediaError::upload(self.kind, key, "injected upload failure"));
        }

        self.objects.write().insert(key.clone(), bytes);
        Ok(join_url(&self.base_url, &object_file_name(key)))
    }

    async fn delete(&self, key: &AssetKey) -> MediaResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(MediaError::delete(self.kind, key, "injected delete failure"));
        }

        match self.objects.write().remove(key) {
            Some(_) => Ok(()),
            None => Err(MediaError::delete(self.kind, key, "no such object")),
        }
    }
}
