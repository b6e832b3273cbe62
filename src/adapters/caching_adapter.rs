//! Memoizing wrapper around a market data port.
//!
//! Results are cached per `(symbol, period, interval)` for series and per
//! symbol for volume stats, failures included. A cached failure is handed
//! back as a fresh `DataUnavailable` on every lookup so each dependent filter
//! still reports it on its own. Entries for a symbol are dropped when the
//! pipeline signals `end_symbol`, so the cache only ever holds the candidate
//! being screened.

use crate::domain::bar::{Series, VolumeStats};
use crate::domain::error::ScreenerError;
use crate::domain::interval::{Interval, Period};
use crate::ports::market_data_port::MarketDataPort;
use std::cell::RefCell;
use std::collections::HashMap;

type SeriesKey = (String, Period, Interval);

pub struct CachingAdapter<P> {
    inner: P,
    series: RefCell<HashMap<SeriesKey, Result<Series, String>>>,
    volume: RefCell<HashMap<String, Result<VolumeStats, String>>>,
}

impl<P: MarketDataPort> CachingAdapter<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            series: RefCell::new(HashMap::new()),
            volume: RefCell::new(HashMap::new()),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.series.borrow().len() + self.volume.borrow().len()
    }
}

fn failure_reason(err: ScreenerError) -> String {
    match err {
        ScreenerError::DataUnavailable { reason, .. } => reason,
        other => other.to_string(),
    }
}

impl<P: MarketDataPort> MarketDataPort for CachingAdapter<P> {
    fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Series, ScreenerError> {
        let key = (symbol.to_uppercase(), period, interval);
        if let Some(cached) = self.series.borrow().get(&key) {
            tracing::trace!(symbol, %period, %interval, "series cache hit");
            return cached
                .clone()
                .map_err(|reason| ScreenerError::data_unavailable(symbol, reason));
        }

        let fetched = self
            .inner
            .fetch_series(symbol, period, interval)
            .map_err(failure_reason);
        self.series.borrow_mut().insert(key, fetched.clone());
        fetched.map_err(|reason| ScreenerError::data_unavailable(symbol, reason))
    }

    fn fetch_volume(&self, symbol: &str) -> Result<VolumeStats, ScreenerError> {
        let key = symbol.to_uppercase();
        if let Some(cached) = self.volume.borrow().get(&key) {
            tracing::trace!(symbol, "volume cache hit");
            return cached
                .clone()
                .map_err(|reason| ScreenerError::data_unavailable(symbol, reason));
        }

        let fetched = self.inner.fetch_volume(symbol).map_err(failure_reason);
        self.volume.borrow_mut().insert(key, fetched.clone());
        fetched.map_err(|reason| ScreenerError::data_unavailable(symbol, reason))
    }

    fn end_symbol(&self, symbol: &str) {
        let key = symbol.to_uppercase();
        self.series.borrow_mut().retain(|(cached, _, _), _| *cached != key);
        self.volume.borrow_mut().remove(&key);
        tracing::trace!(symbol, remaining = self.cached_entries(), "released cached data");
        self.inner.end_symbol(symbol);
    }
}
