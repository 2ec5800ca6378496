//! Pricewise
//!
//! Pricewise compares grocery prices across stores. It resolves the single best discount for a
//! product on a date, splits shopping lists across stores at the lowest effective prices, and
//! ranks active discounts.

pub mod basket;
pub mod catalog;
pub mod discounts;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod queries;
pub mod ranking;
pub mod reports;
