use std::io::Write;

use clap::Args;
use jiff::civil::Date;
use pricewise::{basket::ShoppingItem, catalog::csv::CsvCatalog, queries::DiscountQueryEngine};
use tracing::info;

#[derive(Debug, Args)]
pub(crate) struct BasketArgs {
    /// Shopping list entries as `name` or `name:brand`
    #[arg(required = true, value_parser = parse_item)]
    items: Vec<ShoppingItem>,

    /// Shopping date (defaults to today)
    #[arg(long)]
    date: Option<Date>,
}

pub(crate) fn run(args: BasketArgs, catalog: CsvCatalog, out: impl Write) -> anyhow::Result<()> {
    let date = super::date_or_today(args.date);
    let engine = DiscountQueryEngine::new(catalog);

    let result = engine.optimize_basket(&args.items, date)?;

    info!(
        %date,
        stores = result.stores.len(),
        unmatched = result.unmatched.len(),
        "optimised basket"
    );

    result.write_to(out)?;

    Ok(())
}

fn parse_item(value: &str) -> Result<ShoppingItem, String> {
    let (name, brand) = match value.split_once(':') {
        Some((name, brand)) => (name, Some(brand)),
        None => (value, None),
    };

    if name.trim().is_empty() {
        return Err(format!("missing product name in {value:?}"));
    }

    Ok(ShoppingItem::new(name.trim(), brand.map(str::trim)))
}
