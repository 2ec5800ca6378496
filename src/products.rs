//! Products

use jiff::civil::Date;
use rust_decimal::Decimal;

/// A product as listed by one store on one snapshot date.
///
/// `price` is always the base (pre-discount) price. The `id` is a store-scoped business key and
/// is unique within a single store + date snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    /// Store-scoped product identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Brand, `None` when unspecified
    pub brand: Option<String>,

    /// Product category
    pub category: String,

    /// Package quantity, expressed in `unit`
    pub quantity: Decimal,

    /// Package unit (free text, e.g. "kg", "l", "buc")
    pub unit: String,

    /// Base price
    pub price: Decimal,

    /// Currency code as published by the store
    pub currency: String,

    /// Store name
    pub store: String,

    /// Snapshot date
    pub date: Date,
}

impl Product {
    /// Lowercased, trimmed product name used for matching.
    pub fn name_key(&self) -> String {
        normalize(&self.name)
    }

    /// Lowercased, trimmed brand used for matching; empty when the brand is unspecified.
    pub fn brand_key(&self) -> String {
        self.brand.as_deref().map(normalize).unwrap_or_default()
    }

    /// Returns true if the product has the given (normalised) name and, when `brand` is
    /// non-empty, the given (normalised) brand.
    pub fn matches(&self, name: &str, brand: &str) -> bool {
        self.name_key() == name && (brand.is_empty() || self.brand_key() == brand)
    }
}

/// Normalise a free-text match key: trim surrounding whitespace and lowercase.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalise an optional filter, treating blank values as absent.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value.map(normalize).filter(|value| !value.is_empty())
}


#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{test_support::product, *};

    #[test]
    fn keys_are_trimmed_and_lowercased() {
        let milk = product("P1", "  Lapte UHT ", " Pilos", "lidl", Decimal::ONE);

        assert_eq!(milk.name_key(), "lapte uht");
        assert_eq!(milk.brand_key(), "pilos");
    }

    #[test]
    fn missing_brand_has_empty_key() {
        let bread = product("P2", "paine", "", "lidl", Decimal::ONE);

        assert_eq!(bread.brand_key(), "");
    }

    #[test]
    fn empty_brand_matches_any_brand() {
        let milk = product("P1", "Lapte UHT", "Pilos", "lidl", Decimal::ONE);

        assert!(milk.matches("lapte uht", ""));
        assert!(milk.matches("lapte uht", "pilos"));
        assert!(!milk.matches("lapte uht", "zuzu"));
        assert!(!milk.matches("lapte", ""));
    }

    #[test]
    fn blank_optional_filters_are_absent() {
        assert_eq!(normalize_optional(Some("   ")), None);
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some(" Ariel ")), Some("ariel".to_string()));
    }
}
