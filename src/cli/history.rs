use std::io::Write;

use clap::Args;
use jiff::{ToSpan, civil::Date};
use pricewise::{
    catalog::csv::CsvCatalog,
    pricing::format_money,
    reports::{ReportFilter, price_history},
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

/// Default length of a history, in days after the start date.
const DEFAULT_SPAN_DAYS: i64 = 14;

#[derive(Debug, Args)]
pub(crate) struct HistoryArgs {
    /// First day
    #[arg(long)]
    start: Date,

    /// Last day (defaults to two weeks after the start)
    #[arg(long)]
    end: Option<Date>,

    /// Product name
    #[arg(long)]
    name: Option<String>,

    /// Brand
    #[arg(long)]
    brand: Option<String>,

    /// Store
    #[arg(long)]
    store: Option<String>,

    /// Category
    #[arg(long)]
    category: Option<String>,
}

pub(crate) fn run(
    args: HistoryArgs,
    catalog: &CsvCatalog,
    mut out: impl Write,
) -> anyhow::Result<()> {
    let end = args
        .end
        .unwrap_or_else(|| args.start.saturating_add(DEFAULT_SPAN_DAYS.days()));

    let filter = ReportFilter {
        name: args.name,
        brand: args.brand,
        store: args.store,
        category: args.category,
    };

    let history = price_history(catalog, &filter, args.start, end)?;

    if history.is_empty() {
        writeln!(out, "no prices found between {} and {end}", args.start)?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Date", "Average Price", "Products"]);

    for point in &history {
        builder.push_record([
            point.date.to_string(),
            format_money(point.average_price),
            point.product_count.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(1..3), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}
