use std::{io, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use jiff::{Zoned, civil::Date};
use pricewise::catalog::csv::CsvCatalog;

mod alerts;
mod basket;
mod discounts;
mod history;
mod logging;
mod substitutes;

#[derive(Debug, Parser)]
#[command(
    name = "pricewise",
    about = "Compare grocery prices and discounts across stores",
    long_about = None
)]
pub(crate) struct Cli {
    #[command(flatten)]
    catalog: CatalogArgs,

    #[command(flatten)]
    logging: logging::LoggingArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Split a shopping list across stores at the lowest prices
    Basket(basket::BasketArgs),

    /// Best discounts on one product across all stores
    Best(discounts::BestArgs),

    /// Best discounts at one store
    Store(discounts::StoreArgs),

    /// Best discounts across all stores
    Top(discounts::TopArgs),

    /// Discounts that started recently
    New(discounts::NewArgs),

    /// Daily average prices over a date range
    History(history::HistoryArgs),

    /// Best value alternatives by price per unit
    Substitutes(substitutes::SubstitutesArgs),

    /// Products at or below a target price
    Alerts(alerts::AlertsArgs),
}

/// Where catalog snapshots are read from.
#[derive(Debug, Args)]
struct CatalogArgs {
    /// Directory holding `{store}_{date}.csv` and `{store}_discounts_{date}.csv` files
    #[arg(long, env = "PRICEWISE_DATA_DIR", default_value = "./data", global = true)]
    data_dir: PathBuf,

    /// Stores to read, comma separated
    #[arg(
        long,
        env = "PRICEWISE_STORES",
        value_delimiter = ',',
        default_value = "lidl,kaufland,profi",
        global = true
    )]
    stores: Vec<String>,
}

impl CatalogArgs {
    fn catalog(&self) -> CsvCatalog {
        CsvCatalog::new(&self.data_dir, self.stores.iter().map(|store| store.trim()))
    }
}

impl Cli {
    pub(crate) fn init_logging(&self) -> anyhow::Result<()> {
        self.logging.init()
    }

    pub(crate) fn run(self) -> anyhow::Result<()> {
        let catalog = self.catalog.catalog();
        let out = io::stdout().lock();

        match self.command {
            Commands::Basket(args) => basket::run(args, catalog, out),
            Commands::Best(args) => discounts::best(args, catalog, out),
            Commands::Store(args) => discounts::store(args, catalog, out),
            Commands::Top(args) => discounts::top(args, catalog, out),
            Commands::New(args) => discounts::new_discounts(args, catalog, out),
            Commands::History(args) => history::run(args, &catalog, out),
            Commands::Substitutes(args) => substitutes::run(args, &catalog, out),
            Commands::Alerts(args) => alerts::run(args, &catalog, out),
        }
    }
}

/// The requested date, or today in the system time zone.
fn date_or_today(date: Option<Date>) -> Date {
    date.unwrap_or_else(|| Zoned::now().date())
}
