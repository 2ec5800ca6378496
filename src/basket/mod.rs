//! Basket
//!
//! Splits a shopping list across stores so that every requested item is bought where its
//! effective price is lowest.

use std::collections::BTreeMap;

use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::StoreProducts,
    discounts::Discount,
    pricing::{DiscountIndex, ResolvedPrice, round_money},
    products::{Product, normalize, normalize_optional},
};

pub mod summary;

/// Errors raised while optimising a basket.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BasketError {
    /// Candidate products are priced in different currencies
    #[error("currency mismatch: expected {expected}, found {found} for {product_id} at {store}")]
    CurrencyMismatch {
        /// Currency of the first candidate seen
        expected: String,
        /// Currency of the offending product
        found: String,
        /// Offending product identifier
        product_id: String,
        /// Store listing the offending product
        store: String,
    },
}

/// One line of a shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    /// Desired product name, matched case-insensitively
    pub name: String,

    /// Desired brand; `None` or blank matches any brand
    pub brand: Option<String>,
}

impl ShoppingItem {
    /// Create a shopping list entry.
    pub fn new(name: impl Into<String>, brand: Option<&str>) -> Self {
        Self {
            name: name.into(),
            brand: brand.map(str::to_string),
        }
    }

    /// Normalised `(name, brand)` match key; the brand part is empty when any brand will do.
    pub fn key(&self) -> (String, String) {
        (
            normalize(&self.name),
            normalize_optional(self.brand.as_deref()).unwrap_or_default(),
        )
    }
}

/// The product picked for one shopping list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenProduct {
    /// The shopping list entry this product satisfies
    pub requested: ShoppingItem,

    /// The winning product
    pub product: Product,

    /// Its resolved price on the basket date
    pub price: ResolvedPrice,
}

/// Winning products bought at one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreBasket {
    /// Store name
    pub store: String,

    /// Products to buy there, in shopping list order
    pub products: Vec<ChosenProduct>,
}

/// Result of optimising a shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketResult {
    /// One group per store contributing at least one product, ordered by store name
    pub stores: Vec<StoreBasket>,

    /// Sum of effective prices, rounded once to two decimal places
    pub total_cost: Decimal,

    /// Sum of savings against base prices, rounded once to two decimal places
    pub total_savings: Decimal,

    /// Entries no store carries
    pub unmatched: Vec<ShoppingItem>,

    /// Currency shared by every chosen product; `None` when nothing was matched
    pub currency: Option<String>,

    /// When the result was produced
    pub generated_at: Timestamp,
}

impl BasketResult {
    /// All chosen products, store by store.
    pub fn chosen(&self) -> impl Iterator<Item = &ChosenProduct> {
        self.stores.iter().flat_map(|store| store.products.iter())
    }

    /// The group for `store`, if it contributed anything.
    pub fn store(&self, store: &str) -> Option<&StoreBasket> {
        self.stores.iter().find(|group| group.store == store)
    }
}

/// Drop repeated entries, comparing normalised `(name, brand)` keys. The first occurrence wins.
pub fn deduplicate(items: &[ShoppingItem]) -> Vec<&ShoppingItem> {
    let mut seen = FxHashSet::default();

    items
        .iter()
        .filter(|item| seen.insert(item.key()))
        .collect()
}

/// Find the cheapest product for every shopping list entry and group the winners by store.
///
/// `discounts` should hold every discount visible on `date` for the stores in
/// `products_by_store`; only those applicable on `date` affect prices.
///
/// # Errors
///
/// Returns [`BasketError::CurrencyMismatch`] if the candidates for the list are not all priced
/// in the same currency.
pub fn optimize(
    items: &[ShoppingItem],
    products_by_store: &StoreProducts,
    discounts: &[Discount],
    date: Date,
) -> Result<BasketResult, BasketError> {
    let index = DiscountIndex::new(discounts);
    let mut currency: Option<&str> = None;

    let mut groups: BTreeMap<String, Vec<ChosenProduct>> = BTreeMap::new();
    let mut unmatched = Vec::new();
    let mut total_cost = Decimal::ZERO;
    let mut total_savings = Decimal::ZERO;

    for item in deduplicate(items) {
        let (name, brand) = item.key();

        let Some((product, price)) = cheapest_match(
            &name,
            &brand,
            products_by_store,
            &index,
            date,
            &mut currency,
        )?
        else {
            debug!(name = %item.name, brand = ?item.brand, "no store carries shopping list item");

            unmatched.push(item.clone());
            continue;
        };

        total_cost += price.effective;
        total_savings += price.savings();

        groups
            .entry(product.store.clone())
            .or_default()
            .push(ChosenProduct {
                requested: item.clone(),
                product: product.clone(),
                price,
            });
    }

    let currency = groups
        .values()
        .flatten()
        .next()
        .map(|chosen| chosen.product.currency.clone());

    Ok(BasketResult {
        stores: groups
            .into_iter()
            .map(|(store, products)| StoreBasket { store, products })
            .collect(),
        total_cost: round_money(total_cost),
        total_savings: round_money(total_savings),
        unmatched,
        currency,
        generated_at: Timestamp::now(),
    })
}

/// The matching product with the lowest effective price across all stores.
///
/// Stores are scanned in name order and products in catalog order; the first minimum wins.
/// Every candidate must be priced in `currency`, which the first candidate of the basket fixes.
fn cheapest_match<'p>(
    name: &str,
    brand: &str,
    products_by_store: &'p StoreProducts,
    index: &DiscountIndex<'_>,
    date: Date,
    currency: &mut Option<&'p str>,
) -> Result<Option<(&'p Product, ResolvedPrice)>, BasketError> {
    let mut best: Option<(&'p Product, ResolvedPrice)> = None;

    for product in products_by_store.values().flatten() {
        if !product.matches(name, brand) {
            continue;
        }

        let expected = *currency.get_or_insert(product.currency.as_str());

        if !expected.trim().eq_ignore_ascii_case(product.currency.trim()) {
            return Err(BasketError::CurrencyMismatch {
                expected: expected.to_string(),
                found: product.currency.clone(),
                product_id: product.id.clone(),
                store: product.store.clone(),
            });
        }

        let price = index.resolve(product, date);

        let is_cheaper = best
            .as_ref()
            .is_none_or(|(_, current)| price.effective < current.effective);

        if is_cheaper {
            best = Some((product, price));
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;
    use crate::{discounts::test_support::discount, products::test_support::product};

    fn catalog(products: Vec<Product>) -> StoreProducts {
        let mut by_store = StoreProducts::new();

        for product in products {
            by_store
                .entry(product.store.clone())
                .or_default()
                .push(product);
        }

        by_store
    }

    #[test]
    fn deduplicate_ignores_case_and_whitespace() {
        let items = [
            ShoppingItem::new("Milk", None),
            ShoppingItem::new(" milk ", Some("")),
            ShoppingItem::new("milk", Some("Zuzu")),
            ShoppingItem::new("MILK", Some("zuzu ")),
        ];

        let unique = deduplicate(&items);
        let brands: Vec<Option<&str>> = unique.iter().map(|item| item.brand.as_deref()).collect();

        assert_eq!(brands, [None, Some("Zuzu")]);
    }

    #[test]
    fn picks_cheapest_store_after_discounts() -> TestResult {
        let day = date(2025, 5, 1);
        let products = catalog(vec![
            product("P778", "lapte UHT", "Pilos", "kaufland", Decimal::new(520, 2)),
            product("P778", "lapte UHT", "Pilos", "lidl", Decimal::new(500, 2)),
            product("P038", "detergent lichid", "Ariel", "kaufland", Decimal::new(5050, 2)),
            product("P037", "detergent lichid", "Persil", "lidl", Decimal::new(4990, 2)),
        ]);
        let discounts = [
            discount("P778", "lidl", date(2025, 4, 28), date(2025, 5, 3), 10)?,
        ];
        let items = [
            ShoppingItem::new("lapte UHT", Some("")),
            ShoppingItem::new("detergent lichid", Some("Ariel")),
            ShoppingItem::new("aspirator", None),
        ];

        let result = optimize(&items, &products, &discounts, day)?;

        assert_eq!(result.total_cost, Decimal::new(5500, 2));
        assert_eq!(result.total_savings, Decimal::new(50, 2));
        assert_eq!(result.unmatched, vec![ShoppingItem::new("aspirator", None)]);

        let lidl = result.store("lidl").ok_or("lidl group missing")?;
        let milk = lidl.products.first().ok_or("milk missing")?;

        assert_eq!(milk.product.id, "P778");
        assert_eq!(milk.price.effective, Decimal::new(450, 2));

        let kaufland = result.store("kaufland").ok_or("kaufland group missing")?;

        assert_eq!(kaufland.products.len(), 1);
        assert_eq!(
            kaufland.products.first().map(|chosen| chosen.product.id.as_str()),
            Some("P038")
        );

        Ok(())
    }

    #[test]
    fn stores_are_ordered_by_name() -> TestResult {
        let products = catalog(vec![
            product("P1", "paine", "", "profi", Decimal::ONE),
            product("P2", "oua", "", "kaufland", Decimal::ONE),
            product("P3", "unt", "", "lidl", Decimal::ONE),
        ]);
        let items = [
            ShoppingItem::new("paine", None),
            ShoppingItem::new("unt", None),
            ShoppingItem::new("oua", None),
        ];

        let result = optimize(&items, &products, &[], date(2025, 5, 8))?;
        let stores: Vec<&str> = result.stores.iter().map(|group| group.store.as_str()).collect();

        assert_eq!(stores, ["kaufland", "lidl", "profi"]);

        Ok(())
    }

    #[test]
    fn duplicate_requests_are_bought_once() -> TestResult {
        let products = catalog(vec![product("P1", "Milk", "", "lidl", Decimal::new(300, 2))]);
        let items = [
            ShoppingItem::new("Milk", None),
            ShoppingItem::new("milk", Some("  ")),
        ];

        let result = optimize(&items, &products, &[], date(2025, 5, 8))?;

        assert_eq!(result.chosen().count(), 1);
        assert_eq!(result.total_cost, Decimal::new(300, 2));

        Ok(())
    }

    #[test]
    fn totals_are_rounded_once_at_the_end() -> TestResult {
        let price = Decimal::new(1005, 3);
        let products = catalog(vec![
            product("A", "a", "", "lidl", price),
            product("B", "b", "", "lidl", price),
            product("C", "c", "", "lidl", price),
        ]);
        let items = [
            ShoppingItem::new("a", None),
            ShoppingItem::new("b", None),
            ShoppingItem::new("c", None),
        ];

        let result = optimize(&items, &products, &[], date(2025, 5, 8))?;

        // Per-item rounding would give 1.01 * 3 = 3.03.
        assert_eq!(result.total_cost, Decimal::new(302, 2));

        Ok(())
    }

    #[test]
    fn brand_filter_restricts_candidates() -> TestResult {
        let products = catalog(vec![
            product("P1", "detergent", "Persil", "lidl", Decimal::new(4000, 2)),
            product("P2", "detergent", "Ariel", "profi", Decimal::new(4500, 2)),
        ]);
        let items = [ShoppingItem::new("Detergent", Some("ARIEL"))];

        let result = optimize(&items, &products, &[], date(2025, 5, 8))?;

        assert_eq!(
            result.chosen().map(|chosen| chosen.product.id.as_str()).collect::<Vec<_>>(),
            ["P2"]
        );

        Ok(())
    }

    #[test]
    fn equal_prices_keep_the_first_store() -> TestResult {
        let products = catalog(vec![
            product("P1", "oua", "", "lidl", Decimal::new(1200, 2)),
            product("P1", "oua", "", "kaufland", Decimal::new(1200, 2)),
        ]);
        let items = [ShoppingItem::new("oua", None)];

        let result = optimize(&items, &products, &[], date(2025, 5, 8))?;

        assert_eq!(
            result.stores.first().map(|group| group.store.as_str()),
            Some("kaufland")
        );

        Ok(())
    }

    #[test]
    fn empty_list_produces_empty_basket() -> TestResult {
        let result = optimize(&[], &StoreProducts::new(), &[], date(2025, 5, 8))?;

        assert!(result.stores.is_empty());
        assert!(result.unmatched.is_empty());
        assert_eq!(result.total_cost, Decimal::ZERO);
        assert_eq!(result.total_savings, Decimal::ZERO);
        assert_eq!(result.currency, None);

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let coffee = Product {
            currency: "EUR".to_string(),
            ..product("P2", "cafea", "", "profi", Decimal::new(1000, 2))
        };
        let products = catalog(vec![
            product("P1", "lapte", "", "lidl", Decimal::new(500, 2)),
            coffee,
        ]);
        let items = [
            ShoppingItem::new("lapte", None),
            ShoppingItem::new("cafea", None),
        ];

        let result = optimize(&items, &products, &[], date(2025, 5, 8));

        assert_eq!(
            result,
            Err(BasketError::CurrencyMismatch {
                expected: "RON".to_string(),
                found: "EUR".to_string(),
                product_id: "P2".to_string(),
                store: "profi".to_string(),
            })
        );
    }

    #[test]
    fn candidates_in_another_currency_are_not_compared() {
        let cheaper_in_euro = Product {
            currency: "EUR".to_string(),
            ..product("P1", "oua", "", "lidl", Decimal::new(200, 2))
        };
        let products = catalog(vec![
            product("P1", "oua", "", "kaufland", Decimal::new(1200, 2)),
            cheaper_in_euro,
        ]);

        let items = [ShoppingItem::new("oua", None)];
        let result = optimize(&items, &products, &[], date(2025, 5, 8));

        assert!(matches!(
            result,
            Err(BasketError::CurrencyMismatch { ref found, .. }) if found == "EUR"
        ));
    }

    #[test]
    fn currency_codes_compare_case_insensitively() -> TestResult {
        let lower = Product {
            currency: "ron".to_string(),
            ..product("P2", "paine", "", "profi", Decimal::ONE)
        };
        let products = catalog(vec![product("P1", "lapte", "", "lidl", Decimal::ONE), lower]);
        let items = [
            ShoppingItem::new("lapte", None),
            ShoppingItem::new("paine", None),
        ];

        let result = optimize(&items, &products, &[], date(2025, 5, 8))?;

        assert_eq!(result.currency.as_deref(), Some("RON"));
        assert_eq!(result.total_cost, Decimal::TWO);

        Ok(())
    }
}
