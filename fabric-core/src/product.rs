use serde::{Deserialize, Serialize};

use crate::{AssetKey, Category, GarmentType, ModelPrefix, Side};

/// Identifier of a catalog product row, owned by the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub u64);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored product photo.
///
/// Belongs to exactly one product. Never updated in place: a replacement
/// deletes the old row and creates a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub product_id: ProductId,
    pub key: AssetKey,
    /// Retrieval path resolved by the delivery backend.
    pub path: String,
}

impl ImageAsset {
    pub fn new(product_id: ProductId, key: AssetKey, path: impl Into<String>) -> Self {
        Self {
            product_id,
            key,
            path: path.into(),
        }
    }
}

/// The slice of a product record the media core works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub model: ModelPrefix,
    pub category: Category,
    pub garment: GarmentType,
    pub images: Vec<ImageAsset>,
}

impl ProductRecord {
    pub fn new(id: ProductId, model: ModelPrefix, category: Category, garment: GarmentType) -> Self {
        Self {
            id,
            model,
            category,
            garment,
            images: Vec::new(),
        }
    }

    pub fn with_images(mut self, images: Vec<ImageAsset>) -> Self {
        self.images = images;
        self
    }

    /// Key of this product's photo for the given side.
    pub fn asset_key(&self, side: Side) -> AssetKey {
        AssetKey::derive(&self.model, &self.category, self.garment, side)
    }

    pub fn image_keys(&self) -> Vec<AssetKey> {
        self.images.iter().map(|image| image.key.clone()).collect()
    }
}
