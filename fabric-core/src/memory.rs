use async_trait::async_trait;
use parking_lot::RwLock;

use crate::{CatalogResult, GarmentType, ModelPrefix, ProductLookup, ProductRecord};

/// In-process product table.
///
/// Stands in for the relational catalog in tests and local tooling.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    products: RwLock<Vec<ProductRecord>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<ProductRecord>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }

    /// Insert or replace a product by id.
    pub fn upsert(&self, product: ProductRecord) {
        let mut products = self.products.write();
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
    }

    pub fn len(&self) -> usize {
        self.products.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.read().is_empty()
    }
}

#[async_trait]
impl ProductLookup for MemoryCatalog {
    async fn first_by_model(
        &self,
        model: &ModelPrefix,
        garment: GarmentType,
    ) -> CatalogResult<Option<ProductRecord>> {
        Ok(self
            .products
            .read()
            .iter()
            .filter(|p| &p.model == model && p.garment == garment)
            .min_by_key(|p| p.id)
            .cloned())
    }
}
