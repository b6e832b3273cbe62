//! Universe source backed by a screener-export CSV.
//!
//! The symbol is read from the first column; the listed volume from a
//! configurable column (the default matches the common screener export
//! layout `Symbol,Name,Last Sale,Net Change,% Change,Market Cap,Country,
//! IPO Year,Volume,...`).

use crate::domain::error::ScreenerError;
use crate::domain::universe::{UniverseEntry, UniverseError};
use crate::ports::universe_port::UniversePort;
use std::path::PathBuf;

pub const DEFAULT_VOLUME_COLUMN: usize = 8;

pub struct CsvUniverseAdapter {
    path: PathBuf,
    has_headers: bool,
    volume_column: usize,
}

impl CsvUniverseAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            has_headers: true,
            volume_column: DEFAULT_VOLUME_COLUMN,
        }
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn with_volume_column(mut self, column: usize) -> Self {
        self.volume_column = column;
        self
    }

    fn source_error(&self, reason: impl Into<String>) -> ScreenerError {
        UniverseError::Source {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
        .into()
    }
}

impl UniversePort for CsvUniverseAdapter {
    fn load_entries(&self) -> Result<Vec<UniverseEntry>, ScreenerError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.source_error(e.to_string()))?;

        let mut entries = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.source_error(e.to_string()))?;
            let Some(symbol) = record.get(0).map(str::trim).filter(|s| !s.is_empty()) else {
                tracing::debug!(line, "skipping row without a symbol");
                continue;
            };
            // volumes are sometimes exported with thousands separators
            let volume = record
                .get(self.volume_column)
                .map(|v| v.trim().replace(',', ""))
                .and_then(|v| v.parse::<u64>().ok());
            entries.push(UniverseEntry::new(symbol, volume));
        }

        tracing::debug!(path = %self.path.display(), rows = entries.len(), "universe loaded");
        Ok(entries)
    }
}
