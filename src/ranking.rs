//! Discount ranking

use std::{cmp::Ordering, num::NonZeroUsize};

use jiff::civil::Date;
use rust_decimal::Decimal;

use crate::{
    discounts::{Discount, DiscountPercent},
    products::Product,
    queries::QueryError,
};

/// Number of entries a ranking is cut down to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopN(NonZeroUsize);

impl TopN {
    /// Conventional ranking size when the caller does not specify one.
    pub const DEFAULT: usize = 5;

    /// Create a ranking size.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidTopN`] if `n` is zero.
    pub fn new(n: usize) -> Result<Self, QueryError> {
        NonZeroUsize::new(n)
            .map(Self)
            .ok_or(QueryError::InvalidTopN(n))
    }

    /// The ranking size
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for TopN {
    fn default() -> Self {
        Self(NonZeroUsize::MIN.saturating_add(Self::DEFAULT - 1))
    }
}

/// A product joined with one of its discounts, as listed in a ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedDiscount {
    /// Product identifier
    pub product_id: String,

    /// Product name
    pub name: String,

    /// Product brand
    pub brand: Option<String>,

    /// Base price
    pub price: Decimal,

    /// Discount percentage
    pub percent: DiscountPercent,

    /// First day of the discount
    pub valid_from: Date,

    /// Last day of the discount
    pub valid_to: Date,

    /// Store offering the discount
    pub store: String,
}

impl RankedDiscount {
    /// Join a product with one of its discounts.
    pub fn join(product: &Product, discount: &Discount) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            price: product.price,
            percent: discount.percent(),
            valid_from: discount.valid_from(),
            valid_to: discount.valid_to(),
            store: product.store.clone(),
        }
    }

    /// Absolute amount saved on the base price.
    pub fn savings(&self) -> Decimal {
        self.percent.amount_off(self.price)
    }
}

/// Ranking order: higher percentage first, then larger absolute saving first.
pub fn compare(a: &RankedDiscount, b: &RankedDiscount) -> Ordering {
    b.percent
        .cmp(&a.percent)
        .then_with(|| b.savings().cmp(&a.savings()))
}

/// Sort `entries` into ranking order and keep the first `top_n`.
///
/// The whole list is sorted before truncation.
pub fn rank_and_limit(mut entries: Vec<RankedDiscount>, top_n: TopN) -> Vec<RankedDiscount> {
    entries.sort_unstable_by(compare);
    entries.truncate(top_n.get());
    entries
}
