use std::env;
use std::time::Duration;

use crate::{BackendKind, MediaError, MediaResult};

/// Configuration for transcoding and replication
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Width every photo is stretched to
    pub target_width: u32,

    /// Height every photo is stretched to
    pub target_height: u32,

    /// Upper bound for a single backend leg; `None` waits indefinitely
    pub leg_timeout: Option<Duration>,

    /// Backend whose retrieval path is handed to the persistence layer
    pub delivery: BackendKind,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            target_width: 1048,
            target_height: 1292,
            leg_timeout: None,
            delivery: BackendKind::ObjectStore,
        }
    }
}

impl MediaConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transcoding target resolution
    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_width = width;
        self.target_height = height;
        self
    }

    /// Bound every backend leg by a timeout
    pub fn with_leg_timeout(mut self, timeout: Duration) -> Self {
        self.leg_timeout = Some(timeout);
        self
    }

    /// Choose which backend's path is persisted
    pub fn with_delivery(mut self, backend: BackendKind) -> Self {
        self.delivery = backend;
        self
    }
}

fn required(key: &str) -> MediaResult<String> {
    env::var(key).map_err(|_| MediaError::config(format!("{} environment variable required", key)))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// Connection settings for the S3-compatible object store
#[derive(Debug, Clone)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Base URL the CDN serves the bucket from; defaults to `endpoint/bucket`
    pub public_url: Option<String>,
    /// Prefix prepended to every object key
    pub key_prefix: String,
}

impl ObjectStoreConfig {
    /// Load from `FABRIC_S3_*` environment variables
    pub fn from_env() -> MediaResult<Self> {
        Ok(Self {
            bucket: required("FABRIC_S3_BUCKET")?,
            region: required("FABRIC_S3_REGION")?,
            endpoint_url: optional("FABRIC_S3_ENDPOINT"),
            access_key_id: required("FABRIC_S3_ACCESS_KEY_ID")?,
            secret_access_key: required("FABRIC_S3_SECRET_ACCESS_KEY")?,
            public_url: optional("FABRIC_S3_PUBLIC_URL"),
            key_prefix: optional("FABRIC_S3_KEY_PREFIX").unwrap_or_default(),
        })
    }

    /// Base URL objects are retrieved from
    pub fn retrieval_base(&self) -> String {
        if let Some(public_url) = &self.public_url {
            return public_url.clone();
        }
        match &self.endpoint_url {
            Some(endpoint) => format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", self.bucket, self.region),
        }
    }
}

/// Connection settings for the FTP file host
#[derive(Debug, Clone)]
pub struct FileTransferConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Directory changed into after login; `None` stays in the login directory
    pub remote_dir: Option<String>,
    /// Base URL the file host serves uploaded photos from
    pub public_url: String,
}

impl FileTransferConfig {
    pub const DEFAULT_PORT: u16 = 21;

    /// Load from `FABRIC_FTP_*` environment variables
    pub fn from_env() -> MediaResult<Self> {
        let port = match optional("FABRIC_FTP_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| MediaError::config(format!("FABRIC_FTP_PORT is not a port: {}", raw)))?,
            None => Self::DEFAULT_PORT,
        };

        Ok(Self {
            host: required("FABRIC_FTP_HOST")?,
            port,
            user: required("FABRIC_FTP_USER")?,
            password: required("FABRIC_FTP_PASSWORD")?,
            remote_dir: optional("FABRIC_FTP_DIR"),
            public_url: required("FABRIC_FTP_PUBLIC_URL")?,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_catalog_photography() {
        let config = MediaConfig::default();
        assert_eq!((config.target_width, config.target_height), (1048, 1292));
        assert_eq!(config.delivery, BackendKind::ObjectStore);
        assert!(config.leg_timeout.is_none());
    }

    #[test]
    fn object_store_retrieval_base() {
        let mut config = ObjectStoreConfig {
            bucket: "photos".to_string(),
            region: "eu-central-1".to_string(),
            endpoint_url: Some("http://localhost:9000/".to_string()),
            access_key_id: "key".to_string(),
            secret_access_key: "secret".to_string(),
            public_url: None,
            key_prefix: String::new(),
        };
        assert_eq!(config.retrieval_base(), "http://localhost:9000/photos");

        config.endpoint_url = None;
        assert_eq!(config.retrieval_base(), "https://photos.s3.eu-central-1.amazonaws.com");

        config.public_url = Some("https://cdn.fabric.bg".to_string());
        assert_eq!(config.retrieval_base(), "https://cdn.fabric.bg");
    }
}
