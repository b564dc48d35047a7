use serde::{Deserialize, Serialize};

use crate::{CatalogError, CatalogResult};

/// Garment types sold in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GarmentType {
    TShirt,
    Shorts,
    Sweatshirt,
    LongSleeve,
    Kit,
    Towel,
    Bandana,
}

impl GarmentType {
    /// Every garment type, in catalog order.
    pub const ALL: [GarmentType; 7] = [
        GarmentType::TShirt,
        GarmentType::Shorts,
        GarmentType::Sweatshirt,
        GarmentType::LongSleeve,
        GarmentType::Kit,
        GarmentType::Towel,
        GarmentType::Bandana,
    ];

    /// Type code embedded in asset keys.
    ///
    /// The table is fixed. Types without a dedicated code (T-shirts) map to
    /// the empty string rather than failing.
    pub fn code(&self) -> &'static str {
        match self {
            GarmentType::Shorts => "K",
            GarmentType::Sweatshirt => "SW",
            GarmentType::LongSleeve => "D",
            GarmentType::Kit => "KT",
            GarmentType::Towel => "T",
            GarmentType::Bandana => "B",
            GarmentType::TShirt => "",
        }
    }

    pub fn is_kit(&self) -> bool {
        matches!(self, GarmentType::Kit)
    }
}

/// Which side of the garment a photo shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Front, Side::Back];

    /// Single-letter marker closing every asset key.
    pub fn marker(&self) -> char {
        match self {
            Side::Front => 'F',
            Side::Back => 'B',
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.marker())
    }
}

/// Catalog category code, e.g. `MEN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(String);

impl Category {
    /// Build a category from a letter code. The code is uppercased; anything
    /// other than ASCII letters is rejected because it would make keys ambiguous.
    pub fn new<S: AsRef<str>>(code: S) -> CatalogResult<Self> {
        let code = code.as_ref().trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CatalogError::invalid(format!(
                "category code must be ASCII letters, got {:?}",
                code
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The leading part of a product model used for addressing.
///
/// Keys are always derived from the prefix, never from the full model the
/// user typed in. A prefix built from a model is always exactly
/// [`LEN`](Self::LEN) uppercase letters or digits; a shorter one would let
/// the category bleed into the model part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelPrefix(String);

impl ModelPrefix {
    pub const LEN: usize = 3;

    /// Truncate a user-supplied model to its uppercased addressing prefix.
    pub fn from_model(model: &str) -> CatalogResult<Self> {
        let prefix: String = model
            .trim()
            .chars()
            .take(Self::LEN)
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if prefix.chars().count() < Self::LEN || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CatalogError::invalid(format!(
                "model must start with {} letters or digits, got {:?}",
                Self::LEN,
                model
            )));
        }
        Ok(Self(prefix))
    }

    /// Wrap a prefix read back from storage as-is.
    pub fn new<S: Into<String>>(prefix: S) -> Self {
        Self(prefix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_follow_fixed_table() {
        assert_eq!(GarmentType::Shorts.code(), "K");
        assert_eq!(GarmentType::Sweatshirt.code(), "SW");
        assert_eq!(GarmentType::LongSleeve.code(), "D");
        assert_eq!(GarmentType::Kit.code(), "KT");
        assert_eq!(GarmentType::Towel.code(), "T");
        assert_eq!(GarmentType::Bandana.code(), "B");
        assert_eq!(GarmentType::TShirt.code(), "");
    }

    #[test]
    fn codes_are_distinct() {
        let codes: HashSet<_> = GarmentType::ALL.iter().map(|g| g.code()).collect();
        assert_eq!(codes.len(), GarmentType::ALL.len());
    }

    #[test]
    fn model_prefix_truncates() {
        assert_eq!(ModelPrefix::from_model("123456").unwrap().as_str(), "123");
        assert_eq!(ModelPrefix::from_model(" a1b-summer").unwrap().as_str(), "A1B");
    }

    #[test]
    fn model_prefix_rejects_short_or_punctuated_models() {
        assert!(ModelPrefix::from_model("12").is_err());
        assert!(ModelPrefix::from_model("  ").is_err());
        assert!(ModelPrefix::from_model("1-23").is_err());
    }

    #[test]
    fn category_is_uppercased_and_validated() {
        assert_eq!(Category::new("men").unwrap().as_str(), "MEN");
        assert!(Category::new("").is_err());
        assert!(Category::new("M_N").is_err());
        assert!(Category::new("M3N").is_err());
    }
}
