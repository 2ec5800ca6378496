use std::io::Write;

use clap::Args;
use jiff::civil::Date;
use pricewise::{
    catalog::csv::CsvCatalog,
    pricing::format_money,
    queries::{DiscountQueryEngine, ProductFilter, WithinDays},
    ranking::{RankedDiscount, TopN},
};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use tracing::info;

/// Options shared by every ranking.
#[derive(Debug, Args)]
pub(crate) struct RankingArgs {
    /// Query date (defaults to today)
    #[arg(long)]
    date: Option<Date>,

    /// Number of discounts to list
    #[arg(long, default_value_t = TopN::DEFAULT)]
    top: usize,
}

impl RankingArgs {
    fn resolve(&self) -> anyhow::Result<(Date, TopN)> {
        Ok((super::date_or_today(self.date), TopN::new(self.top)?))
    }
}

#[derive(Debug, Args)]
pub(crate) struct BestArgs {
    /// Product name
    #[arg(long)]
    name: String,

    /// Brand
    #[arg(long)]
    brand: Option<String>,

    #[command(flatten)]
    ranking: RankingArgs,
}

#[derive(Debug, Args)]
pub(crate) struct StoreArgs {
    /// Store name
    store: String,

    #[command(flatten)]
    ranking: RankingArgs,
}

#[derive(Debug, Args)]
pub(crate) struct TopArgs {
    #[command(flatten)]
    ranking: RankingArgs,
}

#[derive(Debug, Args)]
pub(crate) struct NewArgs {
    /// How many days back a discount may have started (1 to 14)
    #[arg(long, default_value_t = WithinDays::MIN)]
    within_days: u32,

    /// Product name
    #[arg(long)]
    name: Option<String>,

    /// Brand
    #[arg(long)]
    brand: Option<String>,

    #[command(flatten)]
    ranking: RankingArgs,
}

pub(crate) fn best(args: BestArgs, catalog: CsvCatalog, out: impl Write) -> anyhow::Result<()> {
    let (date, top_n) = args.ranking.resolve()?;
    let filter = ProductFilter::new(Some(&args.name), args.brand.as_deref());

    let ranked =
        DiscountQueryEngine::new(catalog).best_discounts_for_product(&filter, date, top_n)?;

    write_ranking(out, &ranked)
}

pub(crate) fn store(args: StoreArgs, catalog: CsvCatalog, out: impl Write) -> anyhow::Result<()> {
    let (date, top_n) = args.ranking.resolve()?;

    let ranked =
        DiscountQueryEngine::new(catalog).top_discounts_for_store(&args.store, date, top_n)?;

    write_ranking(out, &ranked)
}

pub(crate) fn top(args: TopArgs, catalog: CsvCatalog, out: impl Write) -> anyhow::Result<()> {
    let (date, top_n) = args.ranking.resolve()?;

    let ranked = DiscountQueryEngine::new(catalog).top_discounts_across_stores(date, top_n)?;

    write_ranking(out, &ranked)
}

pub(crate) fn new_discounts(
    args: NewArgs,
    catalog: CsvCatalog,
    out: impl Write,
) -> anyhow::Result<()> {
    let (date, top_n) = args.ranking.resolve()?;
    let within = WithinDays::new(args.within_days)?;
    let filter = ProductFilter::new(args.name.as_deref(), args.brand.as_deref());

    let ranked = DiscountQueryEngine::new(catalog).new_discounts(&filter, date, within, top_n)?;

    write_ranking(out, &ranked)
}

fn write_ranking(mut out: impl Write, ranked: &[RankedDiscount]) -> anyhow::Result<()> {
    info!(entries = ranked.len(), "ranked discounts");

    if ranked.is_empty() {
        writeln!(out, "no discounts found")?;

        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record([
        "Store", "ID", "Product", "Brand", "Price", "Discount", "Savings", "From", "To",
    ]);

    for entry in ranked {
        builder.push_record([
            entry.store.clone(),
            entry.product_id.clone(),
            entry.name.clone(),
            entry.brand.clone().unwrap_or_default(),
            format_money(entry.price),
            entry.percent.to_string(),
            format_money(entry.savings()),
            entry.valid_from.to_string(),
            entry.valid_to.to_string(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(4..7), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}
