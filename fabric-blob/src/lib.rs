//! # fabric-blob: dual-backend replication of product photography
//!
//! Every product photo is transcoded once into a canonical WebP rendition and
//! written to two independent delivery paths: an S3-compatible object store
//! fronted by the CDN, and a legacy file host reached over FTP.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  MediaService   │  ← product add / edit / remove, kit galleries
//! ├─────────────────┤
//! │   Replicator    │  ← transcode, fan out, reduce by policy
//! ├─────────────────┤
//! │  ReplicaStore   │  ← upload / delete on one backend
//! └─────────────────┘
//! ```
//!
//! Uploads are all-or-nothing across the two backends; deletes are best
//! effort. Both go through one two-leg join, [`fan_out`], parameterized by
//! [`LegPolicy`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fabric_blob::prelude::*;
//! use fabric_core::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> MediaResult<()> {
//! let replicator = Replicator::new(
//!     MemoryStore::object_store(),
//!     MemoryStore::file_transfer(),
//!     MediaConfig::default(),
//! );
//!
//! let raw = bytes::Bytes::from(std::fs::read("front.jpg").unwrap());
//! let category = Category::new("MEN")?;
//! let asset = replicator
//!     .replicate_upload(raw, "123", &category, GarmentType::TShirt, Side::Front)
//!     .await?;
//!
//! assert_eq!(asset.key.as_str(), "123MEN__F");
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod fanout;
mod ftp_store;
mod memory_store;
mod replication;
mod repository;
mod s3_store;
mod service;
mod store;
mod transcode;

pub use config::{FileTransferConfig, MediaConfig, ObjectStoreConfig};
pub use error::{MediaError, MediaResult};
pub use fanout::{fan_out, JoinReport, LegPolicy};
pub use ftp_store::FtpFileStore;
pub use memory_store::MemoryStore;
pub use replication::{DeleteReport, ReplicatedAsset, ReplicationState, Replicator};
pub use repository::{AssetRepository, MemoryAssetRepository};
pub use s3_store::S3ObjectStore;
pub use service::{EditRequest, MediaService, SideUploads};
pub use store::{object_file_name, BackendKind, ReplicaStore};
pub use transcode::{Transcoder, OUTPUT_CONTENT_TYPE, OUTPUT_EXTENSION};

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// For binaries and local tooling that have no subscriber of their own.
#[cfg(feature = "tracing-basic")]
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AssetRepository, BackendKind, DeleteReport, EditRequest, MediaConfig, MediaError,
        MediaResult, MediaService, MemoryAssetRepository, MemoryStore, ReplicaStore,
        ReplicatedAsset, Replicator, SideUploads, Transcoder,
    };
}
