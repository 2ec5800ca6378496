use std::io::Write;

use clap::Args;
use jiff::civil::Date;
use pricewise::{
    catalog::csv::CsvCatalog,
    pricing::format_money,
    reports::{ReportFilter, substitutes},
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

#[derive(Debug, Args)]
pub(crate) struct SubstitutesArgs {
    /// Product name
    #[arg(long)]
    name: String,

    /// Brand
    #[arg(long)]
    brand: Option<String>,

    /// Only list offers from this store
    #[arg(long)]
    store: Option<String>,

    /// Query date (defaults to today)
    #[arg(long)]
    date: Option<Date>,
}

pub(crate) fn run(
    args: SubstitutesArgs,
    catalog: &CsvCatalog,
    mut out: impl Write,
) -> anyhow::Result<()> {
    let date = super::date_or_today(args.date);
    let filter = ReportFilter::named(&args.name)
        .with_brand(args.brand.as_deref())
        .with_store(args.store.as_deref());

    let offers = substitutes(catalog, &filter, date)?;

    let mut builder = Builder::default();

    builder.push_record(["Store", "Product", "Brand", "Package", "Price", "Per Unit"]);

    for offer in &offers {
        let product = &offer.product;

        builder.push_record([
            product.store.clone(),
            product.name.clone(),
            product.brand.clone().unwrap_or_default(),
            format!("{} {}", product.quantity.normalize(), product.unit),
            format_money(product.price),
            format_money(offer.price_per_unit),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(4..6), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}
