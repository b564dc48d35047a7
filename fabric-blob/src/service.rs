use std::collections::BTreeSet;
use std::sync::Arc;

use bytes::Bytes;
use fabric_core::{AssetKey, ImageAsset, KitComposer, ModelPrefix, ProductRecord, Side};
use futures::future::try_join_all;
use tracing::{info, instrument};

use crate::{AssetRepository, DeleteReport, MediaError, MediaResult, Replicator};

/// Photos supplied with an add or edit; either side may be missing.
#[derive(Debug, Clone, Default)]
pub struct SideUploads {
    pub front: Option<Bytes>,
    pub back: Option<Bytes>,
}

impl SideUploads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_front(mut self, bytes: impl Into<Bytes>) -> Self {
        self.front = Some(bytes.into());
        self
    }

    pub fn with_back(mut self, bytes: impl Into<Bytes>) -> Self {
        self.back = Some(bytes.into());
        self
    }

    /// Sides that actually carry a file; empty uploads count as missing
    pub fn present(&self) -> Vec<(Side, Bytes)> {
        [(Side::Front, &self.front), (Side::Back, &self.back)]
            .into_iter()
            .filter_map(|(side, bytes)| match bytes {
                Some(bytes) if !bytes.is_empty() => Some((side, bytes.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }
}

/// Photo changes requested by a product edit
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    pub uploads: SideUploads,
    /// Keys of stored photos to drop
    pub removed: Vec<AssetKey>,
}

/// Product-level photo flows on top of the [`Replicator`].
///
/// Records are written to the [`AssetRepository`] only after every supplied
/// side is committed on both backends; removals drop records regardless of
/// how the backend deletes went.
#[derive(Clone)]
pub struct MediaService {
    replicator: Replicator,
    assets: Arc<dyn AssetRepository>,
    kits: KitComposer,
}

impl MediaService {
    pub fn new<R: AssetRepository + 'static>(replicator: Replicator, assets: R, kits: KitComposer) -> Self {
        Self {
            replicator,
            assets: Arc::new(assets),
            kits,
        }
    }

    pub fn from_arc(replicator: Replicator, assets: Arc<dyn AssetRepository>, kits: KitComposer) -> Self {
        Self {
            replicator,
            assets,
            kits,
        }
    }

    pub fn replicator(&self) -> &Replicator {
        &self.replicator
    }

    /// Replicate the supplied sides of a new product and persist their records.
    #[instrument(skip(self, product, uploads), fields(product = %product.id))]
    pub async fn add_product_images(
        &self,
        product: &ProductRecord,
        uploads: SideUploads,
    ) -> MediaResult<Vec<ImageAsset>> {
        let images = self.upload_sides(product, &uploads).await?;
        self.assets.save_all(&images).await?;

        info!(images = images.len(), "product photos added");
        Ok(images)
    }

    /// Apply an edit's replacements and removals, returning the product's
    /// resulting photos.
    ///
    /// An edit that would leave the product without photos is rejected
    /// before any backend is contacted. Replacements are replicated first:
    /// if any of them fails, nothing of the edit is applied.
    #[instrument(skip(self, product, edit), fields(product = %product.id))]
    pub async fn edit_product_images(
        &self,
        product: &ProductRecord,
        edit: EditRequest,
    ) -> MediaResult<Vec<ImageAsset>> {
        let stored: BTreeSet<AssetKey> = product.image_keys().into_iter().collect();
        let removed: BTreeSet<AssetKey> = edit
            .removed
            .into_iter()
            .filter(|key| stored.contains(key))
            .collect();

        if edit.uploads.is_empty() && removed.len() >= product.images.len() {
            return Err(MediaError::invalid_edit(format!(
                "edit removes {} of {} photos without a replacement",
                removed.len(),
                product.images.len()
            )));
        }

        let uploaded = self.upload_sides(product, &edit.uploads).await?;

        // removed keys that were just re-uploaded are overwritten, not deleted
        let stale: BTreeSet<AssetKey> = removed
            .iter()
            .filter(|key| !uploaded.iter().any(|image| &image.key == *key))
            .cloned()
            .collect();
        if !stale.is_empty() {
            self.replicator.replicate_delete(&stale).await;
            self.assets.delete_by_keys(&stale).await?;
        }
        self.assets.save_all(&uploaded).await?;

        let mut images: Vec<ImageAsset> = product
            .images
            .iter()
            .filter(|image| !removed.contains(&image.key))
            .cloned()
            .collect();
        for image in uploaded {
            match images.iter_mut().find(|existing| existing.key == image.key) {
                Some(existing) => *existing = image,
                None => images.push(image),
            }
        }

        info!(removed = removed.len(), images = images.len(), "product photos edited");
        Ok(images)
    }

    /// Delete every photo of a removed product and drop the records.
    #[instrument(skip(self, product), fields(product = %product.id))]
    pub async fn remove_product_images(&self, product: &ProductRecord) -> MediaResult<DeleteReport> {
        let keys: BTreeSet<AssetKey> = product.image_keys().into_iter().collect();
        if keys.is_empty() {
            return Ok(DeleteReport::default());
        }

        let report = self.replicator.replicate_delete(&keys).await;
        self.assets.delete_by_keys(&keys).await?;
        Ok(report)
    }

    /// Re-publish a soft-deleted product at the same address: its stale
    /// photos are cleared (best effort) and the new ones added.
    #[instrument(skip(self, product, uploads), fields(product = %product.id))]
    pub async fn reactivate_product(
        &self,
        product: &ProductRecord,
        uploads: SideUploads,
    ) -> MediaResult<Vec<ImageAsset>> {
        self.remove_product_images(product).await?;

        let mut fresh = product.clone();
        fresh.images.clear();
        self.add_product_images(&fresh, uploads).await
    }

    /// Ordered gallery of a kit, rebuilt from its constituents.
    pub async fn compose_kit_images(&self, kit_model: &ModelPrefix) -> MediaResult<Vec<ImageAsset>> {
        Ok(self.kits.compose_images(kit_model).await?)
    }

    /// Photos to display for a product: its own, or its constituents' for a kit.
    pub async fn gallery(&self, product: &ProductRecord) -> MediaResult<Vec<ImageAsset>> {
        if product.garment.is_kit() {
            return self.compose_kit_images(&product.model).await;
        }
        Ok(product.images.clone())
    }

    async fn upload_sides(
        &self,
        product: &ProductRecord,
        uploads: &SideUploads,
    ) -> MediaResult<Vec<ImageAsset>> {
        let replicated = try_join_all(
            uploads
                .present()
                .into_iter()
                .map(|(side, bytes)| self.replicator.upload_key(bytes, product.asset_key(side))),
        )
        .await?;

        Ok(replicated
            .into_iter()
            .map(|asset| asset.into_image(product.id))
            .collect())
    }
}
