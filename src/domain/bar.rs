//! Price bars, series and volume statistics.

use crate::domain::interval::Interval;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Chronological bars for one symbol, most recent last.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub symbol: String,
    pub interval: Interval,
    pub bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>, interval: Interval, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeStats {
    pub latest_session_volume: u64,
    pub trailing_average_volume: f64,
}

impl VolumeStats {
    /// Latest session volume against the mean of the trailing `window` sessions
    /// (latest included). Returns `None` for an empty slice or a zero window.
    pub fn from_bars(bars: &[Bar], window: usize) -> Option<Self> {
        let latest = bars.last()?;
        if window == 0 {
            return None;
        }
        let start = bars.len().saturating_sub(window);
        let tail = &bars[start..];
        let total: f64 = tail.iter().map(|b| b.volume as f64).sum();
        Some(Self {
            latest_session_volume: latest.volume,
            trailing_average_volume: total / tail.len() as f64,
        })
    }
}
