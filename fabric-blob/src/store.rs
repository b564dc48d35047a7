use async_trait::async_trait;
use bytes::Bytes;
use fabric_core::AssetKey;
use serde::{Deserialize, Serialize};

use crate::MediaResult;

/// The two independent delivery paths every photo is replicated to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// CDN-backed object store
    ObjectStore,
    /// Legacy file server reached over FTP
    FileTransfer,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::ObjectStore => f.write_str("object-store"),
            BackendKind::FileTransfer => f.write_str("file-transfer"),
        }
    }
}

/// Upload/delete primitive against one storage backend.
///
/// Implementations own their connection lifecycle and must release any
/// connection they hold before returning, on success and on error.
/// Uploading to a key that already exists overwrites the object.
#[async_trait]
pub trait ReplicaStore: Send + Sync {
    /// Which delivery path this store serves
    fn kind(&self) -> BackendKind;

    /// Store canonical image bytes under `key`, returning the retrieval path
    async fn upload(&self, bytes: Bytes, key: &AssetKey) -> MediaResult<String>;

    /// Remove the object stored under `key`
    async fn delete(&self, key: &AssetKey) -> MediaResult<()>;
}

/// File name used for a key on stores that address objects by file name
pub fn object_file_name(key: &AssetKey) -> String {
    format!("{}.{}", key, crate::transcode::OUTPUT_EXTENSION)
}

/// Join a public base URL and an object name without doubling slashes
pub(crate) fn join_url(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name.trim_start_matches('/'))
}
