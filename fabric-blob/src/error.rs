use fabric_core::{AssetKey, CatalogError};
use thiserror::Error;

use crate::BackendKind;

/// Result type for media operations
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while transcoding or replicating product photos
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Unsupported image format: {reason}")]
    UnsupportedFormat { reason: String },

    #[error("Image encoding failed: {reason}")]
    EncodeFailure { reason: String },

    #[error("Upload of {key} to {backend} failed: {source}")]
    Upload {
        backend: BackendKind,
        key: AssetKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Delete of {key} from {backend} failed: {source}")]
    Delete {
        backend: BackendKind,
        key: AssetKey,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{backend} did not finish within {timeout_ms}ms")]
    LegTimeout { backend: BackendKind, timeout_ms: u64 },

    #[error("Replication of {key} failed on {}", describe_failures(.failures))]
    ReplicationFailed {
        key: AssetKey,
        failures: Vec<MediaError>,
    },

    #[error("Invalid edit: {message}")]
    InvalidEdit { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Asset repository error: {source}")]
    Repository {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Background task failed: {message}")]
    Task { message: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

fn describe_failures(failures: &[MediaError]) -> String {
    failures
        .iter()
        .map(|failure| failure.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl MediaError {
    pub fn unsupported_format<S: Into<String>>(reason: S) -> Self {
        Self::UnsupportedFormat {
            reason: reason.into(),
        }
    }

    pub fn encode_failure<S: Into<String>>(reason: S) -> Self {
        Self::EncodeFailure {
            reason: reason.into(),
        }
    }

    /// Create an upload error for one backend leg
    pub fn upload<E>(backend: BackendKind, key: &AssetKey, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Upload {
            backend,
            key: key.clone(),
            source: error.into(),
        }
    }

    /// Create a delete error for one backend leg
    pub fn delete<E>(backend: BackendKind, key: &AssetKey, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Delete {
            backend,
            key: key.clone(),
            source: error.into(),
        }
    }

    pub fn invalid_edit<S: Into<String>>(message: S) -> Self {
        Self::InvalidEdit {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap a failure raised by the persistence collaborator
    pub fn repository<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Repository {
            source: error.into(),
        }
    }

    /// Backend a leg error belongs to, if any
    pub fn backend(&self) -> Option<BackendKind> {
        match self {
            Self::Upload { backend, .. }
            | Self::Delete { backend, .. }
            | Self::LegTimeout { backend, .. } => Some(*backend),
            _ => None,
        }
    }

    /// Leg errors wrapped by an aggregated replication failure
    pub fn leg_failures(&self) -> &[MediaError] {
        match self {
            Self::ReplicationFailed { failures, .. } => failures,
            _ => &[],
        }
    }
}
