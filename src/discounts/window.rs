//! Discount visibility window
//!
//! Discounts are published weekly. For a query date `D` the visible discount data is the
//! union of this week's and last week's publications, cut down to records whose interval
//! overlaps `[D - 7, D + 6]`.

use jiff::{ToSpan, civil::Date};

use crate::discounts::Discount;

/// Days looked back from the query date.
pub const LOOKBACK_DAYS: i64 = 7;

/// Days looked ahead from the query date.
pub const LOOKAHEAD_DAYS: i64 = 6;

/// The span of discount data considered for one query date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityWindow {
    start: Date,
    end: Date,
}

impl VisibilityWindow {
    /// The window for a query date: `[date - 7, date + 6]`, inclusive.
    pub fn around(date: Date) -> Self {
        Self {
            start: date.saturating_sub(LOOKBACK_DAYS.days()),
            end: date.saturating_add(LOOKAHEAD_DAYS.days()),
        }
    }

    /// The publication date of the previous week's discount list for a query date.
    pub fn previous_publication(date: Date) -> Date {
        date.saturating_sub(LOOKBACK_DAYS.days())
    }

    /// First visible day
    pub fn start(&self) -> Date {
        self.start
    }

    /// Last visible day
    pub fn end(&self) -> Date {
        self.end
    }

    /// Returns true if the discount interval overlaps the window.
    pub fn overlaps(&self, discount: &Discount) -> bool {
        !(discount.valid_to() < self.start || discount.valid_from() > self.end)
    }

    /// Drop discounts that lie entirely outside the window.
    pub fn retain_visible(&self, mut discounts: Vec<Discount>) -> Vec<Discount> {
        discounts.retain(|discount| self.overlaps(discount));
        discounts
    }
}
