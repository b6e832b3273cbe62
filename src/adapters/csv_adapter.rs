//! CSV file market data adapter.
//!
//! Bars live in `<base>/<SYMBOL>_<interval>.csv` with the columns
//! `date,open,high,low,close,volume`. When a `5d`, `1wk`, `1mo` or `3mo`
//! file is missing, bars are aggregated from `<SYMBOL>_1d.csv`.

use crate::domain::bar::{Bar, Series, VolumeStats};
use crate::domain::error::ScreenerError;
use crate::domain::interval::{Interval, Period};
use crate::ports::market_data_port::MarketDataPort;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_AVERAGE_VOLUME_WINDOW: usize = 63;

pub struct CsvAdapter {
    base_path: PathBuf,
    average_volume_window: usize,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            base_path,
            average_volume_window: DEFAULT_AVERAGE_VOLUME_WINDOW,
        }
    }

    pub fn with_average_volume_window(mut self, window: usize) -> Self {
        self.average_volume_window = window.max(1);
        self
    }

    fn csv_path(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol.to_uppercase(), interval))
    }

    fn read_bars(&self, symbol: &str, interval: Interval) -> Result<Vec<Bar>, ScreenerError> {
        let path = self.csv_path(symbol, interval);
        let content = fs::read_to_string(&path).map_err(|e| {
            ScreenerError::data_unavailable(
                symbol,
                format!("failed to read {}: {}", path.display(), e),
            )
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| {
                ScreenerError::data_unavailable(symbol, format!("CSV parse error: {}", e))
            })?;

            let date_str = record
                .get(0)
                .ok_or_else(|| ScreenerError::data_unavailable(symbol, "missing date column"))?;
            let timestamp = parse_timestamp(date_str).ok_or_else(|| {
                ScreenerError::data_unavailable(symbol, format!("invalid date: {}", date_str))
            })?;

            bars.push(Bar {
                timestamp,
                open: parse_column(symbol, &record, 1, "open")?,
                high: parse_column(symbol, &record, 2, "high")?,
                low: parse_column(symbol, &record, 3, "low")?,
                close: parse_column(symbol, &record, 4, "close")?,
                volume: parse_column(symbol, &record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn load(&self, symbol: &str, interval: Interval) -> Result<Vec<Bar>, ScreenerError> {
        if interval.is_resampled_from_daily() && !self.csv_path(symbol, interval).exists() {
            tracing::debug!(symbol, %interval, "resampling from daily bars");
            let daily = self.read_bars(symbol, Interval::OneDay)?;
            return Ok(resample(&daily, interval));
        }
        self.read_bars(symbol, interval)
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<Series, ScreenerError> {
        let series = Series::new(
            symbol.to_uppercase(),
            interval,
            apply_period(self.load(symbol, interval)?, period),
        );
        if series.is_empty() {
            return Err(ScreenerError::data_unavailable(symbol, "no bars found"));
        }
        tracing::debug!(symbol, %period, %interval, bars = series.len(), "series loaded");
        Ok(series)
    }

    fn fetch_volume(&self, symbol: &str) -> Result<VolumeStats, ScreenerError> {
        let daily = self.read_bars(symbol, Interval::OneDay)?;
        VolumeStats::from_bars(&daily, self.average_volume_window)
            .ok_or_else(|| ScreenerError::data_unavailable(symbol, "no daily bars found"))
    }
}

fn parse_column<T: std::str::FromStr>(
    symbol: &str,
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<T, ScreenerError>
where
    T::Err: std::fmt::Display,
{
    let raw = record.get(index).ok_or_else(|| {
        ScreenerError::data_unavailable(symbol, format!("missing {} column", name))
    })?;
    raw.trim().parse().map_err(|e| {
        ScreenerError::data_unavailable(symbol, format!("invalid {} value: {}", name, e))
    })
}

fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Keep the bars inside `period`, measured back from the most recent bar.
fn apply_period(bars: Vec<Bar>, period: Period) -> Vec<Bar> {
    let Some(latest) = bars.last().map(|b| b.timestamp) else {
        return bars;
    };
    match period.cutoff(latest) {
        Some(cutoff) => bars.into_iter().filter(|b| b.timestamp >= cutoff).collect(),
        None => bars,
    }
}

/// Aggregate chronological daily bars into `interval` buckets.
///
/// Weeks are ISO weeks, months and quarters are calendar based, and `5d`
/// groups consecutive runs of five sessions counted from the oldest bar.
pub fn resample(daily: &[Bar], interval: Interval) -> Vec<Bar> {
    let bucket = |index: usize, bar: &Bar| -> (i32, u32) {
        let date = bar.timestamp.date();
        match interval {
            Interval::OneWeek => {
                let week = date.iso_week();
                (week.year(), week.week())
            }
            Interval::OneMonth => (date.year(), date.month()),
            Interval::ThreeMonths => (date.year(), date.month0() / 3),
            Interval::FiveDays => (0, (index / 5) as u32),
            _ => (date.year(), date.ordinal()),
        }
    };

    let mut out: Vec<Bar> = Vec::new();
    let mut current_key = None;

    for (index, bar) in daily.iter().enumerate() {
        let key = bucket(index, bar);
        if current_key == Some(key) {
            if let Some(agg) = out.last_mut() {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
                continue;
            }
        }
        out.push(bar.clone());
        current_key = Some(key);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        // Mon 2024-01-08 .. Tue 2024-01-16, two ISO weeks
        let daily = "date,open,high,low,close,volume\n\
            2024-01-08,100.0,110.0,90.0,105.0,1000\n\
            2024-01-09,105.0,115.0,100.0,110.0,2000\n\
            2024-01-10,110.0,112.0,95.0,100.0,3000\n\
            2024-01-15,100.0,108.0,98.0,104.0,4000\n\
            2024-01-16,104.0,106.0,101.0,102.0,6000\n";
        fs::write(path.join("AAPL_1d.csv"), daily).unwrap();

        let hourly = "date,open,high,low,close,volume\n\
            2024-01-16 10:00:00,1.0,2.0,0.5,1.5,10\n\
            2024-01-16 09:00:00,1.0,2.5,0.8,1.2,20\n";
        fs::write(path.join("AAPL_1h.csv"), hourly).unwrap();

        fs::write(
            path.join("EMPTY_1d.csv"),
            "date,open,high,low,close,volume\n",
        )
        .unwrap();
        fs::write(
            path.join("BAD_1d.csv"),
            "date,open,high,low,close,volume\n2024-01-08,x,1,1,1,1\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_series_returns_daily_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_series("AAPL", Period::Max, Interval::OneDay)
            .unwrap();

        assert_eq!(series.symbol, "AAPL");
        assert_eq!(series.len(), 5);
        let first = &series.bars[0];
        assert_eq!(first.high, 110.0);
        assert_eq!(first.low, 90.0);
        assert_eq!(first.close, 105.0);
        assert_eq!(first.volume, 1000);
    }

    #[test]
    fn fetch_series_sorts_intraday_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_series("aapl", Period::OneDay, Interval::OneHour)
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.bars[0].volume, 20);
        assert_eq!(series.bars[1].volume, 10);
    }

    #[test]
    fn period_is_measured_from_latest_bar() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_series("AAPL", Period::FiveDays, Interval::OneDay)
            .unwrap();

        // cutoff 2024-01-11 keeps the 15th and 16th
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn weekly_bars_resampled_from_daily() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter
            .fetch_series("AAPL", Period::Max, Interval::OneWeek)
            .unwrap();

        assert_eq!(series.interval, Interval::OneWeek);
        assert_eq!(series.len(), 2);
        let week1 = &series.bars[0];
        assert_eq!(week1.open, 100.0);
        assert_eq!(week1.high, 115.0);
        assert_eq!(week1.low, 90.0);
        assert_eq!(week1.close, 100.0);
        assert_eq!(week1.volume, 6000);
        let week2 = &series.bars[1];
        assert_eq!(week2.high, 108.0);
        assert_eq!(week2.low, 98.0);
        assert_eq!(week2.volume, 10000);
    }

    #[test]
    fn five_day_buckets_count_sessions() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let daily = adapter.read_bars("AAPL", Interval::OneDay).unwrap();

        let buckets = resample(&daily, Interval::FiveDays);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].volume, 16000);

        let monthly = resample(&daily, Interval::OneMonth);
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].close, 102.0);
    }

    #[test]
    fn missing_file_is_data_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter
            .fetch_series("XYZ", Period::OneYear, Interval::OneDay)
            .unwrap_err();
        assert!(matches!(err, ScreenerError::DataUnavailable { symbol, .. } if symbol == "XYZ"));
    }

    #[test]
    fn empty_file_is_data_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter
            .fetch_series("EMPTY", Period::OneYear, Interval::OneDay)
            .unwrap_err();
        assert!(matches!(err, ScreenerError::DataUnavailable { .. }));
        assert!(adapter.fetch_volume("EMPTY").is_err());
    }

    #[test]
    fn malformed_value_is_data_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter
            .fetch_series("BAD", Period::OneYear, Interval::OneDay)
            .unwrap_err();
        assert!(err.to_string().contains("invalid open value"));
    }

    #[test]
    fn fetch_volume_uses_trailing_window() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path).with_average_volume_window(2);

        let stats = adapter.fetch_volume("AAPL").unwrap();
        assert_eq!(stats.latest_session_volume, 6000);
        assert_relative_eq!(stats.trailing_average_volume, 5000.0);
    }

    #[test]
    fn parse_timestamp_formats() {
        assert!(parse_timestamp("2024-01-08").is_some());
        assert!(parse_timestamp("2024-01-08 09:30:00").is_some());
        assert!(parse_timestamp("2024-01-08T09:30:00").is_some());
        assert!(parse_timestamp("08/01/2024").is_none());
    }
}
