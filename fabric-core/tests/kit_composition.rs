use fabric_core::prelude::*;
use fabric_core::MemoryCatalog;

/// Test factory functions
fn men() -> Category {
    Category::new("MEN").unwrap()
}

fn product_with_photos(id: u64, model: &str, garment: GarmentType) -> ProductRecord {
    let product = ProductRecord::new(ProductId(id), ModelPrefix::new(model), men(), garment);
    let images = Side::BOTH
        .iter()
        .map(|side| {
            let key = product.asset_key(*side);
            let path = format!("https://cdn.test/{}", key);
            ImageAsset::new(product.id, key, path)
        })
        .collect();
    product.with_images(images)
}

fn keys(keys: &[AssetKey]) -> Vec<&str> {
    keys.iter().map(|k| k.as_str()).collect()
}

#[tokio::test]
async fn test_kit_gallery_has_fixed_slot_order() {
    let catalog = MemoryCatalog::with_products(vec![
        product_with_photos(2, "123", GarmentType::Shorts),
        product_with_photos(1, "123", GarmentType::TShirt),
    ]);
    let composer = KitComposer::new(catalog);

    let gallery = composer.compose_keys(&ModelPrefix::new("123")).await.unwrap();

    assert_eq!(keys(&gallery), ["123MEN__F", "123MEN__B", "123MEN_K_F", "123MEN_K_B"]);
}

#[tokio::test]
async fn test_kit_without_constituents_is_empty() {
    let catalog = MemoryCatalog::with_products(vec![product_with_photos(1, "777", GarmentType::TShirt)]);
    let composer = KitComposer::new(catalog);

    let gallery = composer.compose_images(&ModelPrefix::new("123")).await.unwrap();

    assert!(gallery.is_empty());
}

#[tokio::test]
async fn test_kit_with_only_secondary_constituent() {
    let catalog = MemoryCatalog::with_products(vec![product_with_photos(5, "123", GarmentType::Shorts)]);
    let composer = KitComposer::new(catalog);

    let gallery = composer.compose_keys(&ModelPrefix::new("123")).await.unwrap();

    assert_eq!(keys(&gallery), ["123MEN_K_F", "123MEN_K_B"]);
}

#[tokio::test]
async fn test_first_constituent_by_id_is_used() {
    let mut older = product_with_photos(3, "123", GarmentType::TShirt);
    older.images.truncate(1);
    let newer = product_with_photos(9, "123", GarmentType::TShirt);

    let catalog = MemoryCatalog::with_products(vec![newer, older]);
    let composer = KitComposer::new(catalog);

    let gallery = composer.compose_keys(&ModelPrefix::new("123")).await.unwrap();

    assert_eq!(keys(&gallery), ["123MEN__F"]);
}

#[tokio::test]
async fn test_constituent_changes_are_visible_immediately() {
    let catalog = std::sync::Arc::new(MemoryCatalog::with_products(vec![
        product_with_photos(1, "123", GarmentType::TShirt),
    ]));
    let composer = KitComposer::from_arc(catalog.clone());
    let kit = ModelPrefix::new("123");

    assert_eq!(composer.compose_keys(&kit).await.unwrap().len(), 2);

    let mut edited = product_with_photos(1, "123", GarmentType::TShirt);
    edited.images.retain(|image| image.key.as_str().ends_with('B'));
    catalog.upsert(edited);

    assert_eq!(keys(&composer.compose_keys(&kit).await.unwrap()), ["123MEN__B"]);
}

#[tokio::test]
async fn test_kit_with_alphanumeric_model_prefix() {
    let catalog = MemoryCatalog::with_products(vec![
        product_with_photos(1, "A12", GarmentType::TShirt),
        product_with_photos(2, "A12", GarmentType::Shorts),
    ]);
    let composer = KitComposer::new(catalog);

    let gallery = composer.compose_keys(&ModelPrefix::new("A12")).await.unwrap();

    assert_eq!(keys(&gallery), ["A12MEN__F", "A12MEN__B", "A12MEN_K_F", "A12MEN_K_B"]);
}
