//! Pricewise prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    basket::{BasketError, BasketResult, ChosenProduct, ShoppingItem, StoreBasket, optimize},
    catalog::{CatalogError, CatalogView, InMemoryCatalog, StoreProducts, csv::CsvCatalog},
    discounts::{Discount, DiscountError, DiscountPercent, window::VisibilityWindow},
    fixtures::{Fixture, FixtureError},
    pricing::{DiscountIndex, ResolvedPrice, effective_price, round_money},
    products::Product,
    queries::{DiscountQueryEngine, ProductFilter, QueryError, WithinDays},
    ranking::{RankedDiscount, TopN, rank_and_limit},
    reports::{
        PriceAlert, PricePoint, ReportFilter, ValueOffer, price_alerts, price_history, substitutes,
    },
};
