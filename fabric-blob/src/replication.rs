use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use fabric_core::{AssetKey, Category, GarmentType, ImageAsset, ModelPrefix, ProductId, Side};
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::fanout::{fan_out, LegPolicy};
use crate::{
    BackendKind, FtpFileStore, MediaConfig, MediaError, MediaResult, ReplicaStore, S3ObjectStore,
    Transcoder,
};

/// Lifecycle of one replication operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationState {
    Pending,
    InFlight,
    Committed,
    Failed,
}

fn transition(key: &AssetKey, state: ReplicationState) {
    debug!(key = %key, state = ?state, "replication state");
}

/// A photo that reached both backends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicatedAsset {
    pub key: AssetKey,
    pub object_store_path: String,
    pub file_transfer_path: String,
    pub delivery: BackendKind,
}

impl ReplicatedAsset {
    pub fn path(&self, backend: BackendKind) -> &str {
        match backend {
            BackendKind::ObjectStore => &self.object_store_path,
            BackendKind::FileTransfer => &self.file_transfer_path,
        }
    }

    /// Retrieval path of the configured delivery backend
    pub fn delivery_path(&self) -> &str {
        self.path(self.delivery)
    }

    /// The record handed to the persistence layer
    pub fn into_image(self, product_id: ProductId) -> ImageAsset {
        let path = self.delivery_path().to_string();
        ImageAsset::new(product_id, self.key, path)
    }
}

/// Outcome of a best-effort delete
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub keys: Vec<AssetKey>,
    /// Individual leg failures; logged, never returned as errors
    pub failures: Vec<MediaError>,
}

impl DeleteReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replicates product photos to the object store and the file host.
///
/// Uploads are all-or-nothing: a photo is committed only when both backends
/// accepted it, since consumers pick one backend by configuration and a
/// photo present on only one of them breaks half the traffic. Deletes are
/// best effort: failures are logged and never block catalog edits.
#[derive(Clone)]
pub struct Replicator {
    object_store: Arc<dyn ReplicaStore>,
    file_transfer: Arc<dyn ReplicaStore>,
    transcoder: Transcoder,
    config: MediaConfig,
}

impl Replicator {
    pub fn new<O, F>(object_store: O, file_transfer: F, config: MediaConfig) -> Self
    where
        O: ReplicaStore + 'static,
        F: ReplicaStore + 'static,
    {
        Self::from_arcs(Arc::new(object_store), Arc::new(file_transfer), config)
    }

    pub fn from_arcs(
        object_store: Arc<dyn ReplicaStore>,
        file_transfer: Arc<dyn ReplicaStore>,
        config: MediaConfig,
    ) -> Self {
        Self {
            object_store,
            file_transfer,
            transcoder: Transcoder::from_config(&config),
            config,
        }
    }

    /// Wire the S3 and FTP backends from `FABRIC_S3_*` / `FABRIC_FTP_*`
    pub async fn from_env(config: MediaConfig) -> MediaResult<Self> {
        let object_store = S3ObjectStore::from_env().await?;
        let file_transfer = FtpFileStore::from_env()?;
        Ok(Self::new(object_store, file_transfer, config))
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Transcode one side of a product photo and replicate it to both backends.
    ///
    /// `model` is the user-supplied model; only its prefix addresses the photo.
    /// A model too short to yield a full prefix is rejected before transcoding.
    #[instrument(skip(self, raw, category), fields(category = %category))]
    pub async fn replicate_upload(
        &self,
        raw: Bytes,
        model: &str,
        category: &Category,
        garment: GarmentType,
        side: Side,
    ) -> MediaResult<ReplicatedAsset> {
        let key = AssetKey::derive(&ModelPrefix::from_model(model)?, category, garment, side);
        self.upload_key(raw, key).await
    }

    /// Transcode and replicate raw bytes under an already derived key.
    pub async fn upload_key(&self, raw: Bytes, key: AssetKey) -> MediaResult<ReplicatedAsset> {
        transition(&key, ReplicationState::Pending);

        let canonical = match self.transcoder.transcode_blocking(raw).await {
            Ok(canonical) => canonical,
            Err(e) => {
                transition(&key, ReplicationState::Failed);
                return Err(e);
            }
        };

        transition(&key, ReplicationState::InFlight);
        let outcome = fan_out(
            LegPolicy::AllOrNothing,
            &key,
            self.config.leg_timeout,
            (
                BackendKind::ObjectStore,
                self.object_store.upload(canonical.clone(), &key),
            ),
            (
                BackendKind::FileTransfer,
                self.file_transfer.upload(canonical, &key),
            ),
        )
        .await;

        let report = match outcome {
            Ok(report) => report,
            Err(e) => {
                transition(&key, ReplicationState::Failed);
                return Err(e);
            }
        };

        let (Some(object_store_path), Some(file_transfer_path)) = (
            report.value(BackendKind::ObjectStore).cloned(),
            report.value(BackendKind::FileTransfer).cloned(),
        ) else {
            transition(&key, ReplicationState::Failed);
            return Err(MediaError::ReplicationFailed {
                key,
                failures: report.failed,
            });
        };

        transition(&key, ReplicationState::Committed);
        info!(key = %key, "photo replicated to both backends");

        Ok(ReplicatedAsset {
            key,
            object_store_path,
            file_transfer_path,
            delivery: self.config.delivery,
        })
    }

    /// Delete every key from both backends, tolerating any leg failure.
    ///
    /// Keys are processed concurrently. Never fails: the caller may drop the
    /// matching records whatever the report says.
    #[instrument(skip(self, keys), fields(count = keys.len()))]
    pub async fn replicate_delete(&self, keys: &BTreeSet<AssetKey>) -> DeleteReport {
        let reports = join_all(keys.iter().map(|key| self.delete_key(key))).await;

        let mut summary = DeleteReport::default();
        for (key, failures) in keys.iter().zip(reports) {
            summary.keys.push(key.clone());
            summary.failures.extend(failures);
        }

        if !summary.is_clean() {
            warn!(
                failures = summary.failures.len(),
                "some backend deletes failed; objects may be left behind"
            );
        }
        summary
    }

    async fn delete_key(&self, key: &AssetKey) -> Vec<MediaError> {
        transition(key, ReplicationState::InFlight);

        let outcome = fan_out(
            LegPolicy::BestEffort,
            key,
            self.config.leg_timeout,
            (BackendKind::ObjectStore, self.object_store.delete(key)),
            (BackendKind::FileTransfer, self.file_transfer.delete(key)),
        )
        .await;

        transition(key, ReplicationState::Committed);
        match outcome {
            Ok(report) => report.failed,
            // best effort never rejects
            Err(e) => vec![e],
        }
    }
}
