//! Catalogs
//!
//! A catalog hands out the raw product and discount records the engine works on. It holds no
//! pricing logic of its own.

use std::collections::{BTreeMap, BTreeSet};

use jiff::civil::Date;
use thiserror::Error;

use crate::{
    discounts::{Discount, DiscountError, window::VisibilityWindow},
    products::Product,
};

pub mod csv;

/// Products keyed by store name, iterated in name order.
pub type StoreProducts = BTreeMap<String, Vec<Product>>;

/// Errors raised while loading catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading catalog files
    #[error("failed to read catalog data: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] ::csv::Error),

    /// A record that parsed but holds an unusable value
    #[error("invalid record in {source_name} at line {line}: {reason}")]
    InvalidRecord {
        /// File or fixture the record came from
        source_name: String,
        /// One-based line number
        line: u64,
        /// What was wrong with it
        reason: String,
    },

    /// Discount that failed validation
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Read access to product and discount records.
#[cfg_attr(test, mockall::automock)]
pub trait CatalogView {
    /// Products listed on `date`, keyed by store.
    ///
    /// Every store the catalog knows about is present, with an empty list when it has no data
    /// for that day.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying data cannot be read.
    fn products_by_store(&self, date: Date) -> Result<StoreProducts, CatalogError>;

    /// Discounts of the given stores that are visible around `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying data cannot be read.
    fn discounts_for_stores(
        &self,
        stores: &[String],
        date: Date,
    ) -> Result<Vec<Discount>, CatalogError>;
}

/// A catalog held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryCatalog {
    stores: BTreeSet<String>,
    products: Vec<Product>,
    discounts: Vec<Discount>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store, even one without any products.
    pub fn add_store(&mut self, store: impl Into<String>) -> &mut Self {
        self.stores.insert(store.into());
        self
    }

    /// Add a product snapshot; its store is registered as well.
    pub fn add_product(&mut self, product: Product) -> &mut Self {
        self.stores.insert(product.store.clone());
        self.products.push(product);
        self
    }

    /// Add a discount; its store is registered as well.
    pub fn add_discount(&mut self, discount: Discount) -> &mut Self {
        self.stores.insert(discount.store().to_string());
        self.discounts.push(discount);
        self
    }

    /// Known store names, in name order
    pub fn stores(&self) -> impl Iterator<Item = &str> {
        self.stores.iter().map(String::as_str)
    }

    /// All product snapshots, every date included
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// All discounts
    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }
}

impl CatalogView for InMemoryCatalog {
    fn products_by_store(&self, date: Date) -> Result<StoreProducts, CatalogError> {
        let mut by_store: StoreProducts = self
            .stores
            .iter()
            .map(|store| (store.clone(), Vec::new()))
            .collect();

        for product in self.products.iter().filter(|product| product.date == date) {
            by_store
                .entry(product.store.clone())
                .or_default()
                .push(product.clone());
        }

        Ok(by_store)
    }

    fn discounts_for_stores(
        &self,
        stores: &[String],
        date: Date,
    ) -> Result<Vec<Discount>, CatalogError> {
        let window = VisibilityWindow::around(date);

        Ok(self
            .discounts
            .iter()
            .filter(|discount| stores.iter().any(|store| store == discount.store()))
            .filter(|discount| window.overlaps(discount))
            .cloned()
            .collect())
    }
}
