use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream as AwsByteStream, Client};
use bytes::Bytes;
use fabric_core::AssetKey;
use tracing::debug;

use crate::store::join_url;
use crate::transcode::OUTPUT_CONTENT_TYPE;
use crate::{BackendKind, MediaError, MediaResult, ObjectStoreConfig, ReplicaStore};

/// CDN origin bucket reached through any S3-compatible API.
///
/// Stateless per call: the SDK client is cheap to clone and re-entrant, so
/// both legs and concurrent deletes can share one instance.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    key_prefix: String,
    retrieval_base: String,
}

impl S3ObjectStore {
    /// Build a store and its SDK client from explicit settings
    pub async fn new(config: ObjectStoreConfig) -> Self {
        let client = Self::create_client(&config).await;
        Self::from_client(client, &config)
    }

    /// Build a store from `FABRIC_S3_*` environment variables
    pub async fn from_env() -> MediaResult<Self> {
        Ok(Self::new(ObjectStoreConfig::from_env()?).await)
    }

    /// Wrap an already configured SDK client
    pub fn from_client(client: Client, config: &ObjectStoreConfig) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            key_prefix: config.key_prefix.clone(),
            retrieval_base: config.retrieval_base(),
        }
    }

    async fn create_client(config: &ObjectStoreConfig) -> Client {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "fabric",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let aws_config = loader.load().await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                // Custom endpoints (MinIO, RustFS, R2) expect path-style addressing
                .force_path_style(config.endpoint_url.is_some())
                .build(),
        )
    }

    fn object_key(&self, key: &AssetKey) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl ReplicaStore for S3ObjectStore {
    fn kind(&self) -> BackendKind {
        BackendKind::ObjectStore
    }

    async fn upload(&self, bytes: Bytes, key: &AssetKey) -> MediaResult<String> {
        let object_key = self.object_key(key);
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .content_type(OUTPUT_CONTENT_TYPE)
            .body(AwsByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| MediaError::upload(self.kind(), key, e))?;

        debug!(bucket = %self.bucket, key = %object_key, size, "object stored");
        Ok(join_url(&self.retrieval_base, &object_key))
    }

    async fn delete(&self, key: &AssetKey) -> MediaResult<()> {
        let object_key = self.object_key(key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await
            .map_err(|e| MediaError::delete(self.kind(), key, e))?;

        debug!(bucket = %self.bucket, key = %object_key, "object deleted");
        Ok(())
    }
}
