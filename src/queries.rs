//! Discount queries
//!
//! Every query joins each store's products with that store's visible discounts by product
//! identifier, filters the joined entries and ranks them.

use jiff::{ToSpan, civil::Date};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    basket::{self, BasketError, BasketResult, ShoppingItem},
    catalog::{CatalogError, CatalogView, StoreProducts},
    discounts::{Discount, window::VisibilityWindow},
    products::{Product, normalize, normalize_optional},
    ranking::{RankedDiscount, TopN, rank_and_limit},
};

/// Errors raised by queries.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The store has no products on the query date
    #[error("no products found for store: {store}")]
    StoreNotFound {
        /// Requested store
        store: String,
    },

    /// Ranking size of zero
    #[error("top N must be a positive number, got {0}")]
    InvalidTopN(usize),

    /// New-discount lookback outside of `1..=14` days
    #[error("within days must be between 1 and 14, got {0}")]
    InvalidWithinDays(u32),

    /// A filter the query requires was not given
    #[error("missing required filter: {field}")]
    MissingFilter {
        /// Name of the missing filter
        field: &'static str,
    },

    /// No product matches the requested name and brand
    #[error("product not found: {name}")]
    ProductNotFound {
        /// Requested product name
        name: String,
    },

    /// Date range that ends before it starts
    #[error("date range ends ({end}) before it starts ({start})")]
    InvalidDateRange {
        /// First day
        start: Date,
        /// Last day
        end: Date,
    },

    /// Catalog loading error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Basket optimisation error
    #[error(transparent)]
    Basket(#[from] BasketError),
}

/// How many days back a discount may have started to still count as new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithinDays(u8);

impl WithinDays {
    /// Smallest accepted lookback
    pub const MIN: u32 = 1;

    /// Largest accepted lookback
    pub const MAX: u32 = 14;

    /// Create a lookback of `days` days.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidWithinDays`] unless `days` is in `1..=14`.
    pub fn new(days: u32) -> Result<Self, QueryError> {
        if (Self::MIN..=Self::MAX).contains(&days) {
            u8::try_from(days)
                .map(Self)
                .map_err(|_err| QueryError::InvalidWithinDays(days))
        } else {
            Err(QueryError::InvalidWithinDays(days))
        }
    }

    /// Lookback in days
    pub fn get(self) -> u32 {
        u32::from(self.0)
    }

    /// Returns true if a discount starting on `from` is new as of `reference`.
    pub fn contains(self, from: Date, reference: Date) -> bool {
        let earliest = reference.saturating_sub(i64::from(self.0).days());

        earliest <= from && from <= reference
    }
}

impl Default for WithinDays {
    fn default() -> Self {
        Self(1)
    }
}

/// Optional name and brand filters, matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Product name; blank or `None` matches any name
    pub name: Option<String>,

    /// Brand; blank or `None` matches any brand
    pub brand: Option<String>,
}

impl ProductFilter {
    /// Create a filter.
    pub fn new(name: Option<&str>, brand: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            brand: brand.map(str::to_string),
        }
    }

    /// Filter on a product name only.
    pub fn named(name: &str) -> Self {
        Self::new(Some(name), None)
    }

    /// Normalised name, `None` when blank
    pub fn name_key(&self) -> Option<String> {
        normalize_optional(self.name.as_deref())
    }

    /// Normalised brand, `None` when blank
    pub fn brand_key(&self) -> Option<String> {
        normalize_optional(self.brand.as_deref())
    }

    /// Returns true if `product` passes both filters.
    pub fn matches(&self, product: &Product) -> bool {
        let name = self.name_key();
        let brand = self.brand_key().unwrap_or_default();

        name.is_none_or(|name| product.name_key() == name)
            && (brand.is_empty() || product.brand_key() == brand)
    }
}

/// Answers discount rankings and basket optimisations over a catalog.
#[derive(Debug, Clone)]
pub struct DiscountQueryEngine<C> {
    catalog: C,
}

impl<C: CatalogView> DiscountQueryEngine<C> {
    /// Create an engine over `catalog`.
    pub fn new(catalog: C) -> Self {
        Self { catalog }
    }

    /// The underlying catalog
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Best discounts on one product across all stores, optionally restricted to a brand.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MissingFilter`] if the filter has no name, or any catalog error.
    pub fn best_discounts_for_product(
        &self,
        filter: &ProductFilter,
        date: Date,
        top_n: TopN,
    ) -> Result<Vec<RankedDiscount>, QueryError> {
        if filter.name_key().is_none() {
            return Err(QueryError::MissingFilter { field: "name" });
        }

        let by_store = self.catalog.products_by_store(date)?;
        let entries = self.joined(&by_store, date, |product, _| filter.matches(product))?;

        Ok(rank_and_limit(entries, top_n))
    }

    /// Best discounts at one store.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::StoreNotFound`] if the store has no products on `date`, or any
    /// catalog error.
    pub fn top_discounts_for_store(
        &self,
        store: &str,
        date: Date,
        top_n: TopN,
    ) -> Result<Vec<RankedDiscount>, QueryError> {
        let key = normalize(store);

        let by_store: StoreProducts = self
            .catalog
            .products_by_store(date)?
            .into_iter()
            .filter(|(name, products)| normalize(name) == key && !products.is_empty())
            .collect();

        if by_store.is_empty() {
            return Err(QueryError::StoreNotFound {
                store: store.to_string(),
            });
        }

        let entries = self.joined(&by_store, date, |_, _| true)?;

        Ok(rank_and_limit(entries, top_n))
    }

    /// Best discounts across every store, ranked globally.
    ///
    /// # Errors
    ///
    /// Returns any catalog error.
    pub fn top_discounts_across_stores(
        &self,
        date: Date,
        top_n: TopN,
    ) -> Result<Vec<RankedDiscount>, QueryError> {
        let by_store = self.catalog.products_by_store(date)?;
        let entries = self.joined(&by_store, date, |_, _| true)?;

        Ok(rank_and_limit(entries, top_n))
    }

    /// Discounts that started within the last `within` days of `date`, both ends included.
    ///
    /// # Errors
    ///
    /// Returns any catalog error.
    pub fn new_discounts(
        &self,
        filter: &ProductFilter,
        date: Date,
        within: WithinDays,
        top_n: TopN,
    ) -> Result<Vec<RankedDiscount>, QueryError> {
        let by_store = self.catalog.products_by_store(date)?;
        let entries = self.joined(&by_store, date, |product, discount| {
            within.contains(discount.valid_from(), date) && filter.matches(product)
        })?;

        Ok(rank_and_limit(entries, top_n))
    }

    /// Split a shopping list across stores at the lowest effective prices on `date`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Basket`] if the candidates are priced in different currencies, or
    /// any catalog error. Items no store carries are reported in the result.
    pub fn optimize_basket(
        &self,
        items: &[ShoppingItem],
        date: Date,
    ) -> Result<BasketResult, QueryError> {
        let by_store = self.catalog.products_by_store(date)?;
        let discounts = self.visible_discounts(&by_store, date)?;

        Ok(basket::optimize(items, &by_store, &discounts, date)?)
    }

    /// Discounts of every store in `by_store` inside the visibility window of `date`.
    fn visible_discounts(
        &self,
        by_store: &StoreProducts,
        date: Date,
    ) -> Result<Vec<Discount>, QueryError> {
        let stores: Vec<String> = by_store.keys().cloned().collect();
        let discounts = self.catalog.discounts_for_stores(&stores, date)?;

        Ok(VisibilityWindow::around(date).retain_visible(discounts))
    }

    /// Join products with their store's visible discounts, keeping entries `keep` accepts.
    fn joined(
        &self,
        by_store: &StoreProducts,
        date: Date,
        keep: impl Fn(&Product, &Discount) -> bool,
    ) -> Result<Vec<RankedDiscount>, QueryError> {
        let discounts = self.visible_discounts(by_store, date)?;

        let mut discounts_by_store: FxHashMap<&str, Vec<&Discount>> = FxHashMap::default();

        for discount in &discounts {
            discounts_by_store
                .entry(discount.store())
                .or_default()
                .push(discount);
        }

        let mut entries = Vec::new();

        for (store, products) in by_store {
            let Some(store_discounts) = discounts_by_store.get(store.as_str()) else {
                continue;
            };

            let by_id = products_by_id(products);
            let before = entries.len();

            entries.extend(store_discounts.iter().copied().filter_map(|discount| {
                by_id
                    .get(discount.product_id())
                    .copied()
                    .filter(|&product| keep(product, discount))
                    .map(|product| RankedDiscount::join(product, discount))
            }));

            debug!(
                store = %store,
                products = products.len(),
                discounts = store_discounts.len(),
                joined = entries.len() - before,
                "joined store discounts"
            );
        }

        Ok(entries)
    }
}

/// Index a store's products by identifier; the first listing of an identifier wins.
fn products_by_id(products: &[Product]) -> FxHashMap<&str, &Product> {
    let mut by_id = FxHashMap::default();

    for product in products {
        by_id.entry(product.id.as_str()).or_insert(product);
    }

    by_id
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::{
        catalog::MockCatalogView,
        discounts::{DiscountError, test_support::discount},
        products::test_support::product,
    };

    fn engine(
        products: Vec<Product>,
        discounts: Vec<Discount>,
    ) -> DiscountQueryEngine<MockCatalogView> {
        let mut by_store = StoreProducts::new();

        for store in ["kaufland", "lidl", "profi"] {
            by_store.insert(store.to_string(), Vec::new());
        }

        for product in products {
            by_store
                .entry(product.store.clone())
                .or_default()
                .push(product);
        }

        let mut catalog = MockCatalogView::new();

        catalog
            .expect_products_by_store()
            .returning(move |_| Ok(by_store.clone()));

        catalog
            .expect_discounts_for_stores()
            .returning(move |stores, _| {
                Ok(discounts
                    .iter()
                    .filter(|discount| stores.iter().any(|store| store == discount.store()))
                    .cloned()
                    .collect())
            });

        DiscountQueryEngine::new(catalog)
    }

    fn ids(entries: &[RankedDiscount]) -> Vec<(&str, &str)> {
        entries
            .iter()
            .map(|entry| (entry.store.as_str(), entry.product_id.as_str()))
            .collect()
    }

    fn sample() -> Result<DiscountQueryEngine<MockCatalogView>, DiscountError> {
        let day = date(2025, 5, 8);

        Ok(engine(
            vec![
                product("P1", "lapte", "Zuzu", "lidl", Decimal::new(1000, 2)),
                product("P2", "lapte", "Pilos", "lidl", Decimal::new(800, 2)),
                product("P3", "paine", "", "lidl", Decimal::new(300, 2)),
                product("P1", "lapte", "Zuzu", "profi", Decimal::new(5000, 2)),
                product("P7", "cafea", "Jacobs", "kaufland", Decimal::new(3000, 2)),
            ],
            vec![
                discount("P1", "lidl", date(2025, 5, 5), date(2025, 5, 11), 20)?,
                discount("P2", "lidl", day, date(2025, 5, 14), 25)?,
                discount("P3", "lidl", date(2025, 5, 7), date(2025, 5, 9), 10)?,
                discount("P1", "profi", date(2025, 5, 1), date(2025, 5, 8), 20)?,
                // kaufland has no product P9
                discount("P9", "kaufland", day, day, 50)?,
                // outside the visibility window
                discount("P7", "kaufland", date(2025, 4, 1), date(2025, 4, 30), 90)?,
            ],
        ))
    }

    #[test]
    fn within_days_accepts_one_to_fourteen() -> TestResult {
        assert!(matches!(WithinDays::new(0), Err(QueryError::InvalidWithinDays(0))));
        assert!(matches!(WithinDays::new(15), Err(QueryError::InvalidWithinDays(15))));
        assert_eq!(WithinDays::new(14)?.get(), 14);
        assert_eq!(WithinDays::default().get(), 1);

        Ok(())
    }

    #[test]
    fn within_days_includes_both_ends() -> TestResult {
        let within = WithinDays::new(2)?;
        let today = date(2025, 5, 8);

        assert!(within.contains(date(2025, 5, 6), today));
        assert!(within.contains(today, today));
        assert!(!within.contains(date(2025, 5, 5), today));
        assert!(!within.contains(date(2025, 5, 9), today));

        Ok(())
    }

    #[test]
    fn filter_matching_is_case_insensitive() {
        let milk = product("P1", "Lapte", "Zuzu", "lidl", Decimal::ONE);

        assert!(ProductFilter::default().matches(&milk));
        assert!(ProductFilter::new(Some(" LAPTE "), Some("")).matches(&milk));
        assert!(ProductFilter::new(Some("lapte"), Some("zuzu")).matches(&milk));
        assert!(!ProductFilter::new(Some("lapte"), Some("pilos")).matches(&milk));
        assert!(!ProductFilter::named("paine").matches(&milk));
    }

    #[test]
    fn best_discounts_require_a_name() -> TestResult {
        let result = sample()?.best_discounts_for_product(
            &ProductFilter::new(Some("  "), Some("Zuzu")),
            date(2025, 5, 8),
            TopN::default(),
        );

        assert!(matches!(
            result,
            Err(QueryError::MissingFilter { field: "name" })
        ));

        Ok(())
    }

    #[test]
    fn best_discounts_rank_matching_products_across_stores() -> TestResult {
        let ranked = sample()?.best_discounts_for_product(
            &ProductFilter::named("LAPTE"),
            date(2025, 5, 8),
            TopN::default(),
        )?;

        assert_eq!(ids(&ranked), [("lidl", "P2"), ("profi", "P1"), ("lidl", "P1")]);

        let zuzu = sample()?.best_discounts_for_product(
            &ProductFilter::new(Some("lapte"), Some("zuzu")),
            date(2025, 5, 8),
            TopN::new(1)?,
        )?;

        assert_eq!(ids(&zuzu), [("profi", "P1")]);

        Ok(())
    }

    #[test]
    fn store_without_products_is_not_found() -> TestResult {
        let engine = engine(Vec::new(), Vec::new());

        assert!(matches!(
            engine.top_discounts_for_store("profi", date(2025, 5, 8), TopN::default()),
            Err(QueryError::StoreNotFound { ref store }) if store == "profi"
        ));
        assert!(matches!(
            engine.top_discounts_for_store("mega", date(2025, 5, 8), TopN::default()),
            Err(QueryError::StoreNotFound { .. })
        ));

        Ok(())
    }

    #[test]
    fn store_with_products_but_no_discounts_is_empty() -> TestResult {
        let engine = engine(
            vec![product("P1", "lapte", "", "profi", Decimal::ONE)],
            Vec::new(),
        );

        let ranked = engine.top_discounts_for_store("Profi", date(2025, 5, 8), TopN::default())?;

        assert!(ranked.is_empty());

        Ok(())
    }

    #[test]
    fn top_discounts_for_store_stay_in_that_store() -> TestResult {
        let ranked = sample()?.top_discounts_for_store("lidl", date(2025, 5, 8), TopN::default())?;

        assert_eq!(ids(&ranked), [("lidl", "P2"), ("lidl", "P1"), ("lidl", "P3")]);

        Ok(())
    }

    #[test]
    fn top_discounts_are_ranked_globally_and_windowed() -> TestResult {
        let ranked = sample()?.top_discounts_across_stores(date(2025, 5, 8), TopN::new(10)?)?;

        assert_eq!(
            ids(&ranked),
            [("lidl", "P2"), ("profi", "P1"), ("lidl", "P1"), ("lidl", "P3")]
        );
        assert!(ranked.iter().all(|entry| entry.product_id != "P7"));

        Ok(())
    }

    #[test]
    fn new_discounts_started_within_the_lookback() -> TestResult {
        let engine = sample()?;
        let today = date(2025, 5, 8);

        let one_day = engine.new_discounts(
            &ProductFilter::default(),
            today,
            WithinDays::default(),
            TopN::default(),
        )?;

        assert_eq!(ids(&one_day), [("lidl", "P2"), ("lidl", "P3")]);

        let three_days = engine.new_discounts(
            &ProductFilter::named("lapte"),
            today,
            WithinDays::new(3)?,
            TopN::default(),
        )?;

        assert_eq!(ids(&three_days), [("lidl", "P2"), ("lidl", "P1")]);

        Ok(())
    }

    #[test]
    fn optimize_basket_uses_visible_discounts() -> TestResult {
        let result = sample()?.optimize_basket(
            &[
                ShoppingItem::new("lapte", Some("Zuzu")),
                ShoppingItem::new("cafea", None),
            ],
            date(2025, 5, 8),
        )?;

        // lidl 10.00 - 20% = 8.00; kaufland cafea stays 30.00 (its 90% discount expired)
        assert_eq!(result.total_cost, Decimal::new(3800, 2));
        assert_eq!(result.total_savings, Decimal::new(200, 2));
        assert!(result.unmatched.is_empty());

        Ok(())
    }
    #[test]
    fn optimize_basket_refuses_to_add_up_different_currencies() {
        let euro_coffee = Product {
            currency: "EUR".to_string(),
            ..product("P7", "cafea", "", "profi", Decimal::new(1000, 2))
        };
        let engine = engine(
            vec![
                product("P1", "lapte", "", "lidl", Decimal::new(500, 2)),
                euro_coffee,
            ],
            Vec::new(),
        );

        let result = engine.optimize_basket(
            &[
                ShoppingItem::new("lapte", None),
                ShoppingItem::new("cafea", None),
            ],
            date(2025, 5, 8),
        );

        assert!(matches!(
            result,
            Err(QueryError::Basket(BasketError::CurrencyMismatch { ref found, .. })) if found == "EUR"
        ));
    }
}
