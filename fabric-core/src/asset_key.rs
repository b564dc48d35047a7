use serde::{Deserialize, Serialize};

use crate::{Category, GarmentType, ModelPrefix, Side};

/// Ordering key used when a key carries no digits at all.
pub const NO_ORDERING_DIGITS: u64 = u64::MAX;

/// Deterministic identifier of one product photo.
///
/// Layout: `{model_prefix}{category}_{type_code}_{side}`, e.g. `123MEN__F`
/// for a T-shirt front or `123MEN_K_B` for a pair of shorts seen from the
/// back. The same tuple always yields the same key, which is what lets an
/// upload overwrite the previous object in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetKey(String);

impl AssetKey {
    /// Derive the key for one side of a product.
    pub fn derive(model: &ModelPrefix, category: &Category, garment: GarmentType, side: Side) -> Self {
        Self(format!(
            "{}{}_{}_{}",
            model.as_str(),
            category.as_str(),
            garment.code(),
            side.marker()
        ))
    }

    /// Wrap a key read back from storage.
    pub fn from_string<S: Into<String>>(key: S) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Numeric value of all digits in the key, in order.
    ///
    /// Only used to order and de-duplicate images, never for identity.
    /// Keys without digits, or whose digits overflow, sort last.
    pub fn ordering_key(&self) -> u64 {
        let digits: String = self.0.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return NO_ORDERING_DIGITS;
        }
        digits.parse().unwrap_or(NO_ORDERING_DIGITS)
    }
}

impl std::fmt::Display for AssetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
