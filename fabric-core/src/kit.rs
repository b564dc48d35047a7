//! # Kit image composition
//!
//! A kit has no photos of its own. Its gallery is rebuilt on every read from
//! the photos of its constituents: the upper garment (primary) and the lower
//! garment (secondary) that share the kit's model prefix.
//!
//! Each constituent key is classified into one of four slots by its type
//! code and side marker. Within a slot, images are de-duplicated by their
//! ordering key: the first image with a given value fixes the position, a
//! later image with the same value replaces it in place. The storefront
//! relies on the final order being
//!
//! ```text
//! primary-front, primary-back, secondary-front, secondary-back
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::{AssetKey, CatalogResult, GarmentType, ImageAsset, ModelPrefix, ProductRecord};

/// Constituent garments of a kit, primary first.
pub const KIT_MEMBERS: [GarmentType; 2] = [GarmentType::TShirt, GarmentType::Shorts];

/// Gallery slot of a constituent image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KitSlot {
    PrimaryFront,
    PrimaryBack,
    SecondaryFront,
    SecondaryBack,
    Unrecognized,
}

/// Both the current layout (`123MEN__F`, `A12MEN_K_F`) and the older
/// category-less layout (`123_F`, `123K_F`) are still found in storage.
/// Older keys only ever carried numeric models.
static SLOT_PATTERNS: Lazy<Vec<(KitSlot, Regex)>> = Lazy::new(|| {
    [
        (KitSlot::PrimaryFront, r"^(?:\d+_F|[A-Z0-9]+__F)$"),
        (KitSlot::PrimaryBack, r"^(?:\d+_B|[A-Z0-9]+__B)$"),
        (KitSlot::SecondaryFront, r"^(?:\d+K_F|[A-Z0-9]+_K_F)$"),
        (KitSlot::SecondaryBack, r"^(?:\d+K_B|[A-Z0-9]+_K_B)$"),
    ]
    .into_iter()
    .filter_map(|(slot, pattern)| Regex::new(pattern).ok().map(|re| (slot, re)))
    .collect()
});

impl KitSlot {
    /// Slots in gallery order.
    pub const ORDER: [KitSlot; 4] = [
        KitSlot::PrimaryFront,
        KitSlot::PrimaryBack,
        KitSlot::SecondaryFront,
        KitSlot::SecondaryBack,
    ];

    pub fn classify(key: &AssetKey) -> KitSlot {
        SLOT_PATTERNS
            .iter()
            .find(|(_, pattern)| pattern.is_match(key.as_str()))
            .map(|(slot, _)| *slot)
            .unwrap_or(KitSlot::Unrecognized)
    }

    fn position(&self) -> Option<usize> {
        KitSlot::ORDER.iter().position(|slot| slot == self)
    }
}

/// Order a kit's constituent images into its gallery.
///
/// Images are consumed in the order given; unrecognised keys are dropped.
pub fn compose_gallery<I>(images: I) -> Vec<ImageAsset>
where
    I: IntoIterator<Item = ImageAsset>,
{
    let mut buckets: [IndexMap<u64, ImageAsset>; 4] = Default::default();

    for image in images {
        let slot = KitSlot::classify(&image.key);
        match slot.position() {
            Some(index) => {
                buckets[index].insert(image.key.ordering_key(), image);
            }
            None => debug!(key = %image.key, "skipping unrecognized kit constituent image"),
        }
    }

    buckets
        .into_iter()
        .flat_map(|bucket| bucket.into_values())
        .collect()
}

/// Read access to stored products, provided by the persistence layer.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// First product (lowest id) with the given model prefix and garment type.
    async fn first_by_model(
        &self,
        model: &ModelPrefix,
        garment: GarmentType,
    ) -> CatalogResult<Option<ProductRecord>>;
}

/// Rebuilds kit galleries from their constituents.
#[derive(Clone)]
pub struct KitComposer {
    products: Arc<dyn ProductLookup>,
}

impl KitComposer {
    pub fn new<L: ProductLookup + 'static>(products: L) -> Self {
        Self {
            products: Arc::new(products),
        }
    }

    pub fn from_arc(products: Arc<dyn ProductLookup>) -> Self {
        Self { products }
    }

    /// Ordered gallery of the kit with the given model prefix.
    ///
    /// Missing constituents contribute nothing; a kit with none yields an
    /// empty list.
    pub async fn compose_images(&self, kit_model: &ModelPrefix) -> CatalogResult<Vec<ImageAsset>> {
        let mut constituents = Vec::with_capacity(KIT_MEMBERS.len());
        for garment in KIT_MEMBERS {
            if let Some(product) = self.products.first_by_model(kit_model, garment).await? {
                constituents.push(product);
            }
        }

        debug!(
            kit = %kit_model,
            constituents = constituents.len(),
            "composing kit gallery"
        );

        Ok(compose_gallery(
            constituents.into_iter().flat_map(|product| product.images),
        ))
    }

    /// Same as [`compose_images`](Self::compose_images), keys only.
    pub async fn compose_keys(&self, kit_model: &ModelPrefix) -> CatalogResult<Vec<AssetKey>> {
        Ok(self
            .compose_images(kit_model)
            .await?
            .into_iter()
            .map(|image| image.key)
            .collect())
    }
}
