use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const CITY_COLUMN: &str = "City";
const PRICE_COLUMN: &str = "Price";

/// One row of the listings file. Columns other than `City` and `Price` are
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyRecord {
    pub city: String,
    pub price: f64,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

/// Inclusive price extremes of the whole catalog, computed before any
/// filtering so a range widget spans the full dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

/// Inclusive price window applied by the filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

impl PriceRange {
    pub fn contains(self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }
}

/// City selector; `All` is the sentinel that skips the city check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CityFilter {
    All,
    Named(String),
}

impl CityFilter {
    /// Interpret a raw selector string; `all` (any casing) means no filter.
    pub fn from_selector(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Named(raw.trim().to_string())
        }
    }

    pub fn matches(&self, city: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(wanted) => wanted == city,
        }
    }
}

impl Default for CityFilter {
    fn default() -> Self {
        Self::All
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("listings file '{path}' is unavailable")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("listings file is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("listings row at line {line} has a non-numeric price '{value}'")]
    InvalidPrice { line: u64, value: String },
    #[error(transparent)]
    Malformed(#[from] csv::Error),
}

impl CatalogError {
    /// True for the recoverable "data unavailable" condition; callers degrade
    /// to an empty listing with a warning instead of failing.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Read the catalog from disk. Any failure to open the file (missing,
/// permissions) is the recoverable `Unavailable` condition.
pub fn load_from_path(path: &Path) -> Result<Vec<PropertyRecord>, CatalogError> {
    let file = File::open(path).map_err(|source| CatalogError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_reader(file)
}

/// Parse catalog rows from any reader.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Vec<PropertyRecord>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let city_index = headers
        .iter()
        .position(|header| header == CITY_COLUMN)
        .ok_or(CatalogError::MissingColumn(CITY_COLUMN))?;
    let price_index = headers
        .iter()
        .position(|header| header == PRICE_COLUMN)
        .ok_or(CatalogError::MissingColumn(PRICE_COLUMN))?;

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let line = row.position().map(|position| position.line()).unwrap_or(0);

        let city = row.get(city_index).unwrap_or_default().to_string();
        let raw_price = row.get(price_index).unwrap_or_default();
        let price: f64 = raw_price.parse().map_err(|_| CatalogError::InvalidPrice {
            line,
            value: raw_price.to_string(),
        })?;

        let attributes = headers
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != city_index && *index != price_index)
            .map(|(index, header)| {
                (
                    header.to_string(),
                    row.get(index).unwrap_or_default().to_string(),
                )
            })
            .collect();

        records.push(PropertyRecord {
            city,
            price,
            attributes,
        });
    }

    Ok(records)
}

/// Min/max price over the unfiltered catalog; `None` when empty.
pub fn price_bounds(records: &[PropertyRecord]) -> Option<PriceBounds> {
    let mut prices = records.iter().map(|record| record.price);
    let first = prices.next()?;
    let (min, max) = prices.fold((first, first), |(low, high), price| {
        (low.min(price), high.max(price))
    });
    Some(PriceBounds { min, max })
}

/// Distinct city names in first-appearance order, for a selector widget.
pub fn cities(records: &[PropertyRecord]) -> Vec<String> {
    let mut seen = Vec::new();
    for record in records {
        if !seen.iter().any(|known: &String| known == &record.city) {
            seen.push(record.city.clone());
        }
    }
    seen
}

/// Stable filter: keeps records matching the city selector whose price falls
/// inside the inclusive range, preserving input order.
pub fn filter_listings(
    records: &[PropertyRecord],
    city: &CityFilter,
    range: PriceRange,
) -> Vec<PropertyRecord> {
    records
        .iter()
        .filter(|record| city.matches(&record.city) && range.contains(record.price))
        .cloned()
        .collect()
}
