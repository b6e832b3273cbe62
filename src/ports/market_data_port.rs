//! Market data access port: the series and volume-stats accessors.

use crate::domain::bar::{Series, VolumeStats};
use crate::domain::error::ScreenerError;
use crate::domain::interval::{Interval, Period};

pub trait MarketDataPort {
    /// Chronological bars for `symbol`, most recent last.
    ///
    /// Fails with `ScreenerError::DataUnavailable` on an unknown symbol, a
    /// source failure, or an empty result.
    fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Series, ScreenerError>;

    fn fetch_volume(&self, symbol: &str) -> Result<VolumeStats, ScreenerError>;

    /// Called once every filter has been applied to `symbol`. Adapters that
    /// hold per-symbol state release it here.
    fn end_symbol(&self, _symbol: &str) {}
}

impl<T: MarketDataPort + ?Sized> MarketDataPort for &T {
    fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Series, ScreenerError> {
        (**self).fetch_series(symbol, period, interval)
    }

    fn fetch_volume(&self, symbol: &str) -> Result<VolumeStats, ScreenerError> {
        (**self).fetch_volume(symbol)
    }

    fn end_symbol(&self, symbol: &str) {
        (**self).end_symbol(symbol)
    }
}
