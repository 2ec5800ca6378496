//! Discounts
//!
//! A discount is a standalone, time-bounded fact about a product at one store: "product `id`
//! at `store` is `percent` off from `from` until `to`, both days included". It is joined to a
//! [`Product`](crate::products::Product) by the `(product_id, store)` pair.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::civil::Date;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::products::Product;

pub mod window;

/// Errors raised while constructing discount records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Discount percentage outside of `1..=100`.
    #[error("discount percentage must be between 1 and 100, got {0}")]
    PercentOutOfRange(u32),

    /// Validity interval ends before it starts.
    #[error("discount for product {product_id} at {store} ends ({to}) before it starts ({from})")]
    InvertedInterval {
        /// Product identifier the discount refers to
        product_id: String,
        /// Store publishing the discount
        store: String,
        /// Declared start date
        from: Date,
        /// Declared end date
        to: Date,
    },
}

/// A whole-number discount percentage in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    /// Create a percentage from whole percent points.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::PercentOutOfRange`] unless `points` is in `1..=100`.
    pub fn new(points: u32) -> Result<Self, DiscountError> {
        match u8::try_from(points) {
            Ok(value) if (1..=100).contains(&value) => Ok(Self(value)),
            _ => Err(DiscountError::PercentOutOfRange(points)),
        }
    }

    /// Whole percent points (e.g. `10` for 10%).
    pub fn points(self) -> u8 {
        self.0
    }

    /// The percentage as a fraction (10% is 0.1).
    pub fn as_percentage(self) -> Percentage {
        Percentage::from(Decimal::from(self.0) / Decimal::ONE_HUNDRED)
    }

    /// Amount taken off `price` by this percentage.
    pub fn amount_off(self, price: Decimal) -> Decimal {
        self.as_percentage() * price
    }

    /// `price` after this percentage has been taken off.
    pub fn apply(self, price: Decimal) -> Decimal {
        price - self.amount_off(price)
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A time-bounded percentage discount on one product at one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discount {
    product_id: String,
    store: String,
    from: Date,
    to: Date,
    percent: DiscountPercent,
}

impl Discount {
    /// Create a new discount valid from `from` to `to`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::InvertedInterval`] if `to` is before `from`.
    pub fn new(
        product_id: impl Into<String>,
        store: impl Into<String>,
        from: Date,
        to: Date,
        percent: DiscountPercent,
    ) -> Result<Self, DiscountError> {
        let product_id = product_id.into();
        let store = store.into();

        if to < from {
            return Err(DiscountError::InvertedInterval {
                product_id,
                store,
                from,
                to,
            });
        }

        Ok(Self {
            product_id,
            store,
            from,
            to,
            percent,
        })
    }

    /// Identifier of the discounted product
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Store publishing the discount
    pub fn store(&self) -> &str {
        &self.store
    }

    /// First day the discount applies
    pub fn valid_from(&self) -> Date {
        self.from
    }

    /// Last day the discount applies
    pub fn valid_to(&self) -> Date {
        self.to
    }

    /// Discount percentage
    pub fn percent(&self) -> DiscountPercent {
        self.percent
    }

    /// Returns true if `date` falls within the validity interval.
    pub fn is_applicable(&self, date: Date) -> bool {
        self.from <= date && date <= self.to
    }

    /// Returns true if this discount refers to `product` (same identifier, same store).
    pub fn applies_to(&self, product: &Product) -> bool {
        self.product_id == product.id && self.store == product.store
    }
}
