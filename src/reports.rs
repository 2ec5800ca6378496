//! Reports
//!
//! Derived views over catalog snapshots: average price history, best value substitutes and
//! target price alerts.

use jiff::{ToSpan, civil::Date};
use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    catalog::CatalogView,
    discounts::window::VisibilityWindow,
    pricing::{DiscountIndex, ResolvedPrice, round_money},
    products::{Product, normalize, normalize_optional},
    queries::QueryError,
};

/// Optional product filters, matched case-insensitively. Blank values match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    /// Product name
    pub name: Option<String>,

    /// Brand
    pub brand: Option<String>,

    /// Store
    pub store: Option<String>,

    /// Category
    pub category: Option<String>,
}

impl ReportFilter {
    /// Filter on a product name only.
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Restrict to a brand.
    #[must_use]
    pub fn with_brand(mut self, brand: Option<&str>) -> Self {
        self.brand = brand.map(str::to_string);
        self
    }

    /// Restrict to a store.
    #[must_use]
    pub fn with_store(mut self, store: Option<&str>) -> Self {
        self.store = store.map(str::to_string);
        self
    }

    /// Restrict to a category.
    #[must_use]
    pub fn with_category(mut self, category: Option<&str>) -> Self {
        self.category = category.map(str::to_string);
        self
    }

    /// Returns true if `product` passes every filter that is set.
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_product(product)
            && field_matches(self.store.as_deref(), &product.store)
            && field_matches(self.category.as_deref(), &product.category)
    }

    /// Returns true if `product` passes the name and brand filters.
    fn matches_product(&self, product: &Product) -> bool {
        field_matches(self.name.as_deref(), &product.name)
            && normalize_optional(self.brand.as_deref())
                .is_none_or(|brand| product.brand_key() == brand)
    }

    fn required_name(&self) -> Result<String, QueryError> {
        normalize_optional(self.name.as_deref())
            .ok_or(QueryError::MissingFilter { field: "name" })
    }
}

fn field_matches(filter: Option<&str>, value: &str) -> bool {
    normalize_optional(filter).is_none_or(|filter| normalize(value) == filter)
}

/// Average base price of the matching products on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePoint {
    /// Snapshot date
    pub date: Date,

    /// Mean base price, rounded to two decimal places
    pub average_price: Decimal,

    /// Number of products averaged
    pub product_count: usize,
}

/// Daily average prices of the products matching `filter` between `start` and `end`, both
/// included. Days without a matching product are skipped.
///
/// # Errors
///
/// Returns [`QueryError::InvalidDateRange`] if `end` is before `start`, or any catalog error.
pub fn price_history(
    catalog: &impl CatalogView,
    filter: &ReportFilter,
    start: Date,
    end: Date,
) -> Result<Vec<PricePoint>, QueryError> {
    if end < start {
        return Err(QueryError::InvalidDateRange { start, end });
    }

    let mut history = Vec::new();

    for date in start.series(1.day()).take_while(|date| *date <= end) {
        let by_store = catalog.products_by_store(date)?;

        let (total, product_count) = by_store
            .values()
            .flatten()
            .filter(|product| filter.matches(product))
            .fold((Decimal::ZERO, 0_usize), |(total, count), product| {
                (total + product.price, count + 1)
            });

        if product_count == 0 {
            continue;
        }

        history.push(PricePoint {
            date,
            average_price: round_money(total / Decimal::from(product_count)),
            product_count,
        });
    }

    debug!(%start, %end, points = history.len(), "built price history");

    Ok(history)
}

/// Quantity factor converting a package unit into its base unit (kg, l or piece).
///
/// Unknown units count as already being a base unit.
pub fn unit_factor(unit: &str) -> Decimal {
    match normalize(unit).as_str() {
        "g" | "ml" => Decimal::new(1, 3),
        _ => Decimal::ONE,
    }
}

/// A product with its price per base unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueOffer {
    /// The product
    pub product: Product,

    /// Base price divided by the package quantity in base units, unrounded
    pub price_per_unit: Decimal,
}

/// Products with the same name as the first product matching `filter`'s name and brand,
/// sorted by price per base unit, cheapest first.
///
/// Only candidates whose unit converts with the same factor as the reference product are
/// compared. The store filter restricts candidates but not the reference product.
///
/// # Errors
///
/// Returns [`QueryError::MissingFilter`] without a name, [`QueryError::ProductNotFound`] if
/// nothing matches, or any catalog error.
pub fn substitutes(
    catalog: &impl CatalogView,
    filter: &ReportFilter,
    date: Date,
) -> Result<Vec<ValueOffer>, QueryError> {
    let name = filter.required_name()?;
    let by_store = catalog.products_by_store(date)?;

    let reference = by_store
        .values()
        .flatten()
        .find(|product| filter.matches_product(product))
        .ok_or(QueryError::ProductNotFound { name })?;

    let factor = unit_factor(&reference.unit);

    let mut offers: Vec<ValueOffer> = by_store
        .values()
        .flatten()
        .filter(|product| filter.matches(product) && unit_factor(&product.unit) == factor)
        .filter_map(|product| {
            product
                .price
                .checked_div(product.quantity * factor)
                .map(|price_per_unit| ValueOffer {
                    product: product.clone(),
                    price_per_unit,
                })
        })
        .collect();

    offers.sort_by(|a, b| a.price_per_unit.cmp(&b.price_per_unit));

    Ok(offers)
}

/// A product whose effective price reached the alert target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceAlert {
    /// The product
    pub product: Product,

    /// Its resolved price on the alert date
    pub price: ResolvedPrice,
}

/// Products matching `filter` whose effective price on `date` is at or below `target`,
/// cheapest first.
///
/// # Errors
///
/// Returns [`QueryError::MissingFilter`] without a name, or any catalog error.
pub fn price_alerts(
    catalog: &impl CatalogView,
    filter: &ReportFilter,
    target: Decimal,
    date: Date,
) -> Result<Vec<PriceAlert>, QueryError> {
    filter.required_name()?;

    let by_store = catalog.products_by_store(date)?;
    let stores: Vec<String> = by_store
        .keys()
        .filter(|store| field_matches(filter.store.as_deref(), store))
        .cloned()
        .collect();

    let loaded = catalog.discounts_for_stores(&stores, date)?;
    let discounts = VisibilityWindow::around(date).retain_visible(loaded);
    let index = DiscountIndex::new(&discounts);

    let mut alerts: Vec<PriceAlert> = by_store
        .values()
        .flatten()
        .filter(|product| filter.matches(product))
        .map(|product| PriceAlert {
            product: product.clone(),
            price: index.resolve(product, date),
        })
        .filter(|alert| alert.price.effective <= target)
        .collect();

    alerts.sort_by(|a, b| a.price.effective.cmp(&b.price.effective));

    Ok(alerts)
}
