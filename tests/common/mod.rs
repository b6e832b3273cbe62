#![allow(dead_code)]

use barscreen::domain::bar::{Bar, Series, VolumeStats};
use barscreen::domain::error::ScreenerError;
use barscreen::domain::interval::{Interval, Period};
use barscreen::ports::market_data_port::MarketDataPort;
use chrono::{NaiveDate, TimeDelta};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory market data keyed by `(symbol, interval)`. The requested period
/// is ignored; every request is recorded.
pub struct MockMarketData {
    pub series: HashMap<(String, Interval), Vec<Bar>>,
    pub volume: HashMap<String, VolumeStats>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, Period, Interval)>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            volume: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, interval: Interval, bars: Vec<Bar>) -> Self {
        self.series.insert((symbol.to_string(), interval), bars);
        self
    }

    pub fn with_volume(mut self, symbol: &str, latest: u64, average: f64) -> Self {
        self.volume.insert(
            symbol.to_string(),
            VolumeStats {
                latest_session_volume: latest,
                trailing_average_volume: average,
            },
        );
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Series, ScreenerError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), period, interval));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScreenerError::data_unavailable(symbol, reason.clone()));
        }
        match self.series.get(&(symbol.to_string(), interval)) {
            Some(bars) if !bars.is_empty() => Ok(Series::new(symbol, interval, bars.clone())),
            _ => Err(ScreenerError::data_unavailable(symbol, "no bars found")),
        }
    }

    fn fetch_volume(&self, symbol: &str) -> Result<VolumeStats, ScreenerError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScreenerError::data_unavailable(symbol, reason.clone()));
        }
        self.volume
            .get(symbol)
            .copied()
            .ok_or_else(|| ScreenerError::data_unavailable(symbol, "no volume data"))
    }
}

/// Daily bars starting 2024-01-02 from `(low, high, close)` triples.
pub fn make_bars(points: &[(f64, f64, f64)]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    points
        .iter()
        .enumerate()
        .map(|(i, &(low, high, close))| Bar {
            timestamp: start + TimeDelta::days(i as i64),
            open: close,
            high,
            low,
            close,
            volume: 1_000,
        })
        .collect()
}

/// Bars whose ranges narrow strictly over the trailing window.
pub fn narrowing_bars(count: usize) -> Vec<Bar> {
    let points: Vec<_> = (0..count)
        .map(|i| {
            let step = i as f64;
            (10.0 + step, 30.0 - step, 20.0)
        })
        .collect();
    make_bars(&points)
}

/// Bars whose ranges widen on every session.
pub fn widening_bars(count: usize) -> Vec<Bar> {
    let points: Vec<_> = (0..count)
        .map(|i| {
            let step = i as f64;
            (10.0 - step, 30.0 + step, 20.0)
        })
        .collect();
    make_bars(&points)
}

pub fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
