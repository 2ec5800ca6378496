//! CSV catalog
//!
//! Reads weekly store snapshots from a directory of semicolon separated files:
//!
//! - `{store}_{YYYY-MM-DD}.csv`: `product_id;product_name;product_category;brand;package_quantity;package_unit;price;currency`
//! - `{store}_discounts_{YYYY-MM-DD}.csv`: `product_id;product_name;brand;package_quantity;package_unit;product_category;from_date;to_date;percentage_of_discount`
//!
//! Both files start with a header row. The store and snapshot date come from the file name.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use ::csv::{ReaderBuilder, StringRecord, Trim};
use jiff::civil::Date;
use tracing::debug;

use crate::{
    catalog::{CatalogError, CatalogView, StoreProducts},
    discounts::{Discount, DiscountPercent, window::VisibilityWindow},
    products::Product,
};

/// A catalog backed by a directory of CSV snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvCatalog {
    dir: PathBuf,
    stores: Vec<String>,
}

impl CsvCatalog {
    /// Create a catalog reading `stores` from `dir`.
    pub fn new<S: Into<String>>(
        dir: impl Into<PathBuf>,
        stores: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            dir: dir.into(),
            stores: stores.into_iter().map(Into::into).collect(),
        }
    }

    /// Directory holding the snapshots
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stores this catalog reads
    pub fn stores(&self) -> &[String] {
        &self.stores
    }

    /// Path of the product snapshot of `store` on `date`.
    pub fn product_file(&self, store: &str, date: Date) -> PathBuf {
        self.dir.join(format!("{store}_{date}.csv"))
    }

    /// Path of the discount list `store` published on `date`.
    pub fn discount_file(&self, store: &str, date: Date) -> PathBuf {
        self.dir.join(format!("{store}_discounts_{date}.csv"))
    }

    /// Load the product snapshot of `store` on `date`. A missing file yields no products.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or holds a malformed row.
    pub fn load_products(&self, store: &str, date: Date) -> Result<Vec<Product>, CatalogError> {
        let path = self.product_file(store, date);

        read_rows(&path, |row| {
            Ok(Product {
                id: row.text(0)?,
                name: row.text(1)?,
                category: row.text(2)?,
                brand: row.optional_text(3),
                quantity: row.parse(4)?,
                unit: row.text(5)?,
                price: row.parse(6)?,
                currency: row.text(7)?,
                store: store.to_string(),
                date,
            })
        })
    }

    /// Load the discount list `store` published on `date`. A missing file yields no discounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, holds a malformed row, or
    /// declares an invalid discount.
    pub fn load_discounts(&self, store: &str, date: Date) -> Result<Vec<Discount>, CatalogError> {
        let path = self.discount_file(store, date);

        read_rows(&path, |row| {
            let percent = DiscountPercent::new(row.parse(8)?).map_err(|err| row.invalid(err))?;

            Discount::new(row.text(0)?, store, row.parse(6)?, row.parse(7)?, percent)
                .map_err(|err| row.invalid(err))
        })
    }
}

impl CatalogView for CsvCatalog {
    fn products_by_store(&self, date: Date) -> Result<StoreProducts, CatalogError> {
        self.stores
            .iter()
            .map(|store| {
                self.load_products(store, date)
                    .map(|products| (store.clone(), products))
            })
            .collect()
    }

    fn discounts_for_stores(
        &self,
        stores: &[String],
        date: Date,
    ) -> Result<Vec<Discount>, CatalogError> {
        let previous = VisibilityWindow::previous_publication(date);
        let mut discounts = Vec::new();

        for store in stores {
            discounts.extend(self.load_discounts(store, date)?);
            discounts.extend(self.load_discounts(store, previous)?);
        }

        Ok(VisibilityWindow::around(date).retain_visible(discounts))
    }
}

/// One data row together with where it came from.
struct Row<'a> {
    source_name: &'a str,
    line: u64,
    record: StringRecord,
}

impl Row<'_> {
    fn invalid(&self, reason: impl fmt::Display) -> CatalogError {
        CatalogError::InvalidRecord {
            source_name: self.source_name.to_string(),
            line: self.line,
            reason: reason.to_string(),
        }
    }

    fn field(&self, index: usize) -> Result<&str, CatalogError> {
        self.record
            .get(index)
            .ok_or_else(|| self.invalid(format!("missing column {}", index + 1)))
    }

    fn text(&self, index: usize) -> Result<String, CatalogError> {
        self.field(index).map(str::to_string)
    }

    fn optional_text(&self, index: usize) -> Option<String> {
        self.record
            .get(index)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn parse<T>(&self, index: usize) -> Result<T, CatalogError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let value = self.field(index)?;

        value
            .parse()
            .map_err(|err| self.invalid(format!("column {} ({value:?}): {err}", index + 1)))
    }
}

fn read_rows<T>(
    path: &Path,
    mut parse_row: impl FnMut(&Row<'_>) -> Result<T, CatalogError>,
) -> Result<Vec<T>, CatalogError> {
    if !path.is_file() {
        debug!(path = %path.display(), "catalog file missing, treating as empty");

        return Ok(Vec::new());
    }

    let source_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;

        if record.iter().all(str::is_empty) {
            continue;
        }

        let row = Row {
            source_name: &source_name,
            line: record.position().map_or(0, ::csv::Position::line),
            record,
        };

        rows.push(parse_row(&row)?);
    }

    debug!(path = %path.display(), rows = rows.len(), "loaded catalog file");

    Ok(rows)
}
