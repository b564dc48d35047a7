//! # fabric-core: catalog vocabulary and photo addressing
//!
//! Every product photo in the Fabric catalog is addressed by an [`AssetKey`]
//! derived from the product's model prefix, category, garment type and the
//! side the photo shows. No surrogate id is generated: the same tuple always
//! addresses the same object in every storage backend.
//!
//! ```rust
//! use fabric_core::prelude::*;
//!
//! let model = ModelPrefix::from_model("123-summer").unwrap();
//! let category = Category::new("men").unwrap();
//! let key = AssetKey::derive(&model, &category, GarmentType::Shorts, Side::Front);
//!
//! assert_eq!(key.as_str(), "123MEN_K_F");
//! ```
//!
//! Kits carry no photos of their own; [`KitComposer`] rebuilds a kit's
//! gallery from its constituents on every read.

mod asset_key;
mod error;
mod garment;
pub mod kit;
mod memory;
mod product;

pub use asset_key::{AssetKey, NO_ORDERING_DIGITS};
pub use error::{CatalogError, CatalogResult};
pub use garment::{Category, GarmentType, ModelPrefix, Side};
pub use kit::{compose_gallery, KitComposer, KitSlot, ProductLookup, KIT_MEMBERS};
pub use memory::MemoryCatalog;
pub use product::{ImageAsset, ProductId, ProductRecord};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AssetKey, CatalogError, CatalogResult, Category, GarmentType, ImageAsset, KitComposer,
        ModelPrefix, ProductId, ProductLookup, ProductRecord, Side,
    };
}
