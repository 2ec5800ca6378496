use std::io::Write;

use clap::Args;
use jiff::civil::Date;
use pricewise::{
    catalog::csv::CsvCatalog,
    pricing::format_money,
    reports::{ReportFilter, price_alerts},
};
use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use tracing::info;

#[derive(Debug, Args)]
pub(crate) struct AlertsArgs {
    /// Product name
    #[arg(long)]
    name: String,

    /// Target price; products at or below it are listed
    #[arg(long)]
    target: Decimal,

    /// Brand
    #[arg(long)]
    brand: Option<String>,

    /// Store
    #[arg(long)]
    store: Option<String>,

    /// Query date (defaults to today)
    #[arg(long)]
    date: Option<Date>,
}

pub(crate) fn run(
    args: AlertsArgs,
    catalog: &CsvCatalog,
    mut out: impl Write,
) -> anyhow::Result<()> {
    let date = super::date_or_today(args.date);
    let filter = ReportFilter::named(&args.name)
        .with_brand(args.brand.as_deref())
        .with_store(args.store.as_deref());

    let alerts = price_alerts(catalog, &filter, args.target, date)?;

    info!(%date, target = %args.target, matches = alerts.len(), "checked price alerts");

    if alerts.is_empty() {
        writeln!(out, "nothing at or below {} on {date}", format_money(args.target))?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Store", "Product", "Brand", "Base Price", "Price", "Discount"]);

    for alert in &alerts {
        builder.push_record([
            alert.product.store.clone(),
            alert.product.name.clone(),
            alert.product.brand.clone().unwrap_or_default(),
            format_money(alert.price.base),
            format_money(alert.price.effective),
            alert
                .price
                .percent
                .map(|percent| percent.to_string())
                .unwrap_or_default(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..5), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}
