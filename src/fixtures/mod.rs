//! Fixtures
//!
//! YAML fixture sets describing store snapshots and discount lists, loaded into an
//! [`InMemoryCatalog`].

use std::{fs, path::PathBuf};

use thiserror::Error;

use crate::{
    catalog::InMemoryCatalog,
    discounts::{Discount, DiscountError},
    fixtures::{discounts::DiscountsFixture, products::ProductsFixture},
};

pub mod discounts;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid package size format
    #[error("Invalid package format: {0}")]
    InvalidPackage(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Discount that failed validation
    #[error("Invalid discount: {0}")]
    Discount(#[from] DiscountError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Everything loaded so far
    catalog: InMemoryCatalog,

    /// Currency shared by every loaded product
    currency: Option<String>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: InMemoryCatalog::new(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, holds an invalid price or package
    /// size, or prices products in more than one currency.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for store in fixture.stores {
            self.catalog.add_store(store);
        }

        for product_fixture in fixture.products {
            let product = product_fixture.try_into_product(fixture.date)?;

            match &self.currency {
                Some(existing) if *existing != product.currency => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.clone(),
                        product.currency,
                    ));
                }
                Some(_) => {}
                None => self.currency = Some(product.currency.clone()),
            }

            self.catalog.add_product(product);
        }

        Ok(self)
    }

    /// Load discounts from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or declares an invalid discount.
    pub fn load_discounts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("discounts")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let fixture: DiscountsFixture = serde_norway::from_str(&contents)?;

        for discount_fixture in fixture.discounts {
            self.catalog.add_discount(Discount::try_from(discount_fixture)?);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products and discounts with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_products(name)?.load_discounts(name)?;

        Ok(fixture)
    }

    /// Currency of the loaded products, `None` before any product is loaded
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    /// The catalog built from the loaded fixtures
    pub fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }

    /// Take the catalog built from the loaded fixtures
    pub fn into_catalog(self) -> InMemoryCatalog {
        self.catalog
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
