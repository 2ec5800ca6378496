//! Pricing
//!
//! Resolves the single effective price of a product on a date. Discounts are mutually
//! exclusive alternatives: when several apply on the same day the one producing the lowest
//! price wins, they never stack.

use jiff::civil::Date;
use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashMap;

use crate::{
    discounts::{Discount, DiscountPercent},
    products::Product,
};

/// Number of decimal places money is rounded to.
pub const MONEY_DP: u32 = 2;

/// Round a money amount to two decimal places, halves away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a money amount rounded to two decimal places, e.g. `4.50`.
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount))
}

/// The outcome of resolving a product's price on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrice {
    /// Base (pre-discount) price
    pub base: Decimal,

    /// Price after the best applicable discount, unrounded
    pub effective: Decimal,

    /// Percentage of the winning discount, if any applied
    pub percent: Option<DiscountPercent>,
}

impl ResolvedPrice {
    /// Amount saved against the base price
    pub fn savings(&self) -> Decimal {
        self.base - self.effective
    }
}

/// Find the applicable discount that yields the lowest price for `product` on `date`.
///
/// Only discounts with the product's identifier and store whose interval contains `date` are
/// considered. Ties resolve to the first minimum in iteration order, the price is identical.
pub fn best_discount<'d>(
    product: &Product,
    discounts: impl IntoIterator<Item = &'d Discount>,
    date: Date,
) -> Option<&'d Discount> {
    discounts
        .into_iter()
        .filter(|discount| discount.applies_to(product) && discount.is_applicable(date))
        .min_by_key(|discount| discount.percent().apply(product.price))
}

/// Resolve the price of `product` on `date` against a set of discounts.
pub fn resolve<'d>(
    product: &Product,
    discounts: impl IntoIterator<Item = &'d Discount>,
    date: Date,
) -> ResolvedPrice {
    let winner = best_discount(product, discounts, date);

    ResolvedPrice {
        base: product.price,
        effective: winner.map_or(product.price, |discount| {
            discount.percent().apply(product.price)
        }),
        percent: winner.map(Discount::percent),
    }
}

/// The effective price of `product` on `date`: the base price reduced by the best applicable
/// discount, or the base price unchanged when none applies.
pub fn effective_price<'d>(
    product: &Product,
    discounts: impl IntoIterator<Item = &'d Discount>,
    date: Date,
) -> Decimal {
    resolve(product, discounts, date).effective
}

/// Discounts grouped by store and product identifier for repeated lookups.
#[derive(Debug, Default)]
pub struct DiscountIndex<'d> {
    by_store: FxHashMap<&'d str, FxHashMap<&'d str, Vec<&'d Discount>>>,
}

impl<'d> DiscountIndex<'d> {
    /// Index a set of discounts.
    pub fn new(discounts: &'d [Discount]) -> Self {
        let mut by_store: FxHashMap<&'d str, FxHashMap<&'d str, Vec<&'d Discount>>> =
            FxHashMap::default();

        for discount in discounts {
            by_store
                .entry(discount.store())
                .or_default()
                .entry(discount.product_id())
                .or_default()
                .push(discount);
        }

        Self { by_store }
    }

    /// Discounts recorded for the product's identifier at the product's store.
    pub fn candidates(&self, product: &Product) -> &[&'d Discount] {
        self.by_store
            .get(product.store.as_str())
            .and_then(|products| products.get(product.id.as_str()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolve the price of `product` on `date`.
    pub fn resolve(&self, product: &Product, date: Date) -> ResolvedPrice {
        resolve(product, self.candidates(product).iter().copied(), date)
    }
}
