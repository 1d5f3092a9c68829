use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::{info, warn};

use super::error::Error;
use super::types::RateFetcher;
use common::{FetchError, RateTable};

// Helper struct for CSV parsing
#[derive(Debug, Deserialize, Default)]
pub struct CsvRecord {
    #[serde(rename = "base")]
    pub base: String,

    #[serde(rename = "target")]
    pub target: String,

    #[serde(rename = "rate")]
    pub rate_value: f64,
}

/// Offline quotes loaded once from a `base,target,rate` CSV file.
///
/// Symbols are upper-cased on load. A later row for the same `(base, target)`
/// replaces an earlier one.
#[derive(Debug, Clone)]
pub struct CsvRateFetcher {
    tables: BTreeMap<String, RateTable>,
}

impl CsvRateFetcher {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path: PathBuf = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "Failed to read quotes file");
            Error::IoError(e)
        })?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut tables: BTreeMap<String, RateTable> = BTreeMap::new();
        let mut rows = 0usize;

        for result in rdr.deserialize() {
            let record: CsvRecord = result?;
            tables
                .entry(record.base.to_uppercase())
                .or_default()
                .insert(record.target.to_uppercase(), record.rate_value);
            rows += 1;
        }

        info!(path = %path.display(), rows, bases = tables.len(), "Loaded quotes from CSV");
        Ok(Self { tables })
    }
}

#[async_trait]
impl RateFetcher for CsvRateFetcher {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, FetchError> {
        self.tables
            .get(base)
            .cloned()
            .ok_or_else(|| FetchError::NoData(base.to_string()))
    }
}
