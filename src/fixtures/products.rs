//! Product Fixtures

use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{fixtures::FixtureError, products::Product};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Snapshot date for products that don't declare their own
    pub date: Date,

    /// Stores to register even when they list no products
    #[serde(default)]
    pub stores: Vec<String>,

    /// Product listings
    pub products: Vec<ProductFixture>,
}

/// Product fixture from YAML
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Store-scoped product identifier
    pub id: String,

    /// Store listing the product
    pub store: String,

    /// Product name
    pub name: String,

    /// Brand
    #[serde(default)]
    pub brand: Option<String>,

    /// Category
    pub category: String,

    /// Package size (e.g., "500 g")
    pub package: String,

    /// Price (e.g., "5.00 RON")
    pub price: String,

    /// Snapshot date override
    #[serde(default)]
    pub date: Option<Date>,
}

impl ProductFixture {
    /// Convert into a [`Product`], dated `default_date` unless the fixture overrides it.
    ///
    /// # Errors
    ///
    /// Returns an error if the package or price cannot be parsed.
    pub fn try_into_product(self, default_date: Date) -> Result<Product, FixtureError> {
        let (quantity, unit) = parse_package(&self.package)?;
        let (price, currency) = parse_price(&self.price)?;

        Ok(Product {
            id: self.id,
            name: self.name,
            brand: self.brand.filter(|brand| !brand.trim().is_empty()),
            category: self.category,
            quantity,
            unit,
            price,
            currency,
            store: self.store,
            date: self.date.unwrap_or(default_date),
        })
    }
}

/// Parse a price string such as "5.00 RON" into its amount and currency code.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPrice`] if the string is not an amount followed by a code.
pub fn parse_price(value: &str) -> Result<(Decimal, String), FixtureError> {
    split_amount(value).ok_or_else(|| FixtureError::InvalidPrice(value.to_string()))
}

/// Parse a package size such as "500 g" into its quantity and unit.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPackage`] if the string is not a quantity followed by a
/// unit, or the quantity is not positive.
pub fn parse_package(value: &str) -> Result<(Decimal, String), FixtureError> {
    split_amount(value)
        .filter(|(quantity, _)| quantity.is_sign_positive() && !quantity.is_zero())
        .ok_or_else(|| FixtureError::InvalidPackage(value.to_string()))
}

fn split_amount(value: &str) -> Option<(Decimal, String)> {
    let mut parts = value.split_whitespace();

    let amount = parts.next()?.parse::<Decimal>().ok()?;
    let code = parts.next()?;

    if parts.next().is_some() {
        return None;
    }

    Some((amount, code.to_string()))
}
