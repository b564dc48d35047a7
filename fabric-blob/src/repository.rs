use std::collections::BTreeSet;

use async_trait::async_trait;
use fabric_core::{AssetKey, ImageAsset, ProductId};
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::MediaResult;

/// Persistence of image records, provided by the catalog database layer.
///
/// Called only after replication succeeded (uploads) or unconditionally
/// (deletes).
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Insert records; a record whose key already exists replaces it.
    async fn save_all(&self, assets: &[ImageAsset]) -> MediaResult<()>;

    /// Drop the records with the given keys; unknown keys are ignored.
    async fn delete_by_keys(&self, keys: &BTreeSet<AssetKey>) -> MediaResult<()>;

    async fn find_by_product(&self, product_id: ProductId) -> MediaResult<Vec<ImageAsset>>;
}

/// In-process image table keyed by asset key, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryAssetRepository {
    assets: RwLock<IndexMap<AssetKey, ImageAsset>>,
}

impl MemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.read().is_empty()
    }

    pub fn get(&self, key: &AssetKey) -> Option<ImageAsset> {
        self.assets.read().get(key).cloned()
    }
}

#[async_trait]
impl AssetRepository for MemoryAssetRepository {
    async fn save_all(&self, assets: &[ImageAsset]) -> MediaResult<()> {
        let mut table = self.assets.write();
        for asset in assets {
            table.insert(asset.key.clone(), asset.clone());
        }
        Ok(())
    }

    async fn delete_by_keys(&self, keys: &BTreeSet<AssetKey>) -> MediaResult<()> {
        self.assets.write().retain(|key, _| !keys.contains(key));
        Ok(())
    }

    async fn find_by_product(&self, product_id: ProductId) -> MediaResult<Vec<ImageAsset>> {
        Ok(self
            .assets
            .read()
            .values()
            .filter(|asset| asset.product_id == product_id)
            .cloned()
            .collect())
    }
}
