//! Basket summary rendering

use std::io;

use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

use crate::{
    basket::{BasketResult, ChosenProduct},
    pricing::format_money,
};

impl BasketResult {
    /// Write the basket as a table of store groups followed by totals and unmatched items.
    ///
    /// # Errors
    ///
    /// Returns any error raised while writing to `out`.
    pub fn write_to(&self, mut out: impl io::Write) -> io::Result<()> {
        let mut builder = Builder::default();

        builder.push_record([
            "Store",
            "Item",
            "Brand",
            "Base Price",
            "Price",
            "Savings",
            "Discount",
        ]);

        for group in &self.stores {
            for (idx, chosen) in group.products.iter().enumerate() {
                let store = if idx == 0 {
                    group.store.clone()
                } else {
                    String::new()
                };

                builder.push_record(product_row(store, chosen));
            }
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..6), Alignment::right());

        writeln!(out, "\n{table}")?;

        let currency = self.currency.as_deref().unwrap_or_default();

        writeln!(out, " Total:   {}", money(self.total_cost, currency))?;
        writeln!(out, " Savings: {}", money(self.total_savings, currency))?;

        if !self.unmatched.is_empty() {
            let names: Vec<String> = self
                .unmatched
                .iter()
                .map(|item| match item.brand.as_deref().map(str::trim) {
                    Some(brand) if !brand.is_empty() => format!("{} ({brand})", item.name),
                    _ => item.name.clone(),
                })
                .collect();

            writeln!(out, " Not found: {}", names.join(", "))?;
        }

        writeln!(out)
    }
}

fn product_row(store: String, chosen: &ChosenProduct) -> [String; 7] {
    let currency = chosen.product.currency.as_str();

    [
        store,
        chosen.product.name.clone(),
        chosen.product.brand.clone().unwrap_or_default(),
        money(chosen.price.base, currency),
        money(chosen.price.effective, currency),
        money(chosen.price.savings(), currency),
        chosen
            .price
            .percent
            .map(|percent| percent.to_string())
            .unwrap_or_default(),
    ]
}

/// Format an amount rounded to two decimal places followed by its currency.
fn money(amount: Decimal, currency: &str) -> String {
    let amount = format_money(amount);

    if currency.is_empty() {
        amount
    } else {
        format!("{amount} {currency}")
    }
}
