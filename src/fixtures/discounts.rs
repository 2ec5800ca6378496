//! Discount Fixtures

use jiff::civil::Date;
use serde::Deserialize;

use crate::{
    discounts::{Discount, DiscountPercent},
    fixtures::FixtureError,
};

/// Wrapper for discounts in YAML
#[derive(Debug, Deserialize)]
pub struct DiscountsFixture {
    /// Discount records
    pub discounts: Vec<DiscountFixture>,
}

/// Discount fixture from YAML
#[derive(Debug, Deserialize)]
pub struct DiscountFixture {
    /// Identifier of the discounted product
    pub id: String,

    /// Store publishing the discount
    pub store: String,

    /// First day, inclusive
    pub from: Date,

    /// Last day, inclusive
    pub to: Date,

    /// Whole percent points taken off (e.g., 10 for 10%)
    pub percentage: u32,
}

impl TryFrom<DiscountFixture> for Discount {
    type Error = FixtureError;

    fn try_from(fixture: DiscountFixture) -> Result<Self, Self::Error> {
        let percent = DiscountPercent::new(fixture.percentage)?;

        Ok(Discount::new(
            fixture.id,
            fixture.store,
            fixture.from,
            fixture.to,
            percent,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use testresult::TestResult;

    use super::*;
    use crate::discounts::DiscountError;

    fn fixture(from: Date, to: Date, percentage: u32) -> DiscountFixture {
        DiscountFixture {
            id: "P001".to_string(),
            store: "lidl".to_string(),
            from,
            to,
            percentage,
        }
    }

    #[test]
    fn converts_into_discount() -> TestResult {
        let discount = Discount::try_from(fixture(date(2025, 5, 1), date(2025, 5, 7), 15))?;

        assert_eq!(discount.product_id(), "P001");
        assert_eq!(discount.store(), "lidl");
        assert_eq!(discount.percent().points(), 15);

        Ok(())
    }

    #[test]
    fn invalid_records_are_rejected() {
        assert!(matches!(
            Discount::try_from(fixture(date(2025, 5, 1), date(2025, 5, 7), 0)),
            Err(FixtureError::Discount(DiscountError::PercentOutOfRange(0)))
        ));
        assert!(matches!(
            Discount::try_from(fixture(date(2025, 5, 7), date(2025, 5, 1), 10)),
            Err(FixtureError::Discount(DiscountError::InvertedInterval { .. }))
        ));
    }
}
