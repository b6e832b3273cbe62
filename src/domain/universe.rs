//! Candidate universe for screening.
//!
//! Parses explicit symbol lists and applies the static liquidity pre-screen
//! (symbol shape and listed volume) to rows supplied by a universe source.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    pub symbols: Vec<String>,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    #[error("universe source {path}: {reason}")]
    Source { path: String, reason: String },

    #[error("no candidate symbols")]
    Empty,
}

/// One row of a universe source: a symbol and its listed volume, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct UniverseEntry {
    pub symbol: String,
    pub volume: Option<u64>,
}

impl UniverseEntry {
    pub fn new(symbol: impl Into<String>, volume: Option<u64>) -> Self {
        Self {
            symbol: symbol.into(),
            volume,
        }
    }
}

/// Static pre-screen applied before any market data is requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniverseCriteria {
    pub max_symbol_len: Option<usize>,
    pub alphabetic_only: bool,
    pub min_volume: Option<u64>,
}

impl UniverseCriteria {
    pub fn accepts(&self, entry: &UniverseEntry) -> bool {
        if let Some(max_len) = self.max_symbol_len {
            if entry.symbol.chars().count() > max_len {
                return false;
            }
        }
        if self.alphabetic_only && !entry.symbol.chars().all(|c| c.is_ascii_alphabetic()) {
            return false;
        }
        if let Some(floor) = self.min_volume {
            // rows without a listed volume can't clear a volume floor
            match entry.volume {
                Some(v) if v > floor => {}
                _ => return false,
            }
        }
        true
    }

    pub fn is_unrestricted(&self) -> bool {
        self.max_symbol_len.is_none() && !self.alphabetic_only && self.min_volume.is_none()
    }
}

/// Parse a user-supplied list of symbols separated by commas or whitespace.
///
/// Symbols are upper-cased. Repeating a symbol is an error, as is an empty
/// token between two commas.
pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for chunk in input.split(',') {
        let tokens: Vec<&str> = chunk.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        for token in tokens {
            let code = token.to_uppercase();
            if !seen.insert(code.clone()) {
                return Err(UniverseError::DuplicateCode(code));
            }
            codes.push(code);
        }
    }

    Ok(codes)
}

/// Apply `criteria` to source rows, keeping source order and the first
/// occurrence of each symbol.
pub fn select(entries: Vec<UniverseEntry>, criteria: &UniverseCriteria) -> Universe {
    let mut seen = HashSet::new();
    let mut symbols = Vec::new();
    let total = entries.len();

    for entry in entries {
        let symbol = entry.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            continue;
        }
        let entry = UniverseEntry { symbol, ..entry };
        if !criteria.accepts(&entry) {
            tracing::trace!(symbol = %entry.symbol, "excluded by universe criteria");
            continue;
        }
        if seen.insert(entry.symbol.clone()) {
            symbols.push(entry.symbol);
        }
    }

    tracing::debug!(total, selected = symbols.len(), "universe pre-screen");
    Universe { symbols }
}
