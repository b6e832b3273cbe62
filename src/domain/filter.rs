//! Screening filters: parameterized predicates bound to market data.
//!
//! A [`FilterSpec`] is validated when it is built, so every constructed
//! filter is safe to apply to any symbol. Applying it yields a [`Verdict`];
//! data problems become `Verdict::Indeterminate` instead of errors so a
//! single symbol never aborts a screen.

use crate::domain::bar::{Series, VolumeStats};
use crate::domain::error::{PatternError, ScreenerError};
use crate::domain::interval::{Interval, Period};
use crate::domain::pattern;
use crate::ports::market_data_port::MarketDataPort;
use std::fmt;

pub const DEFAULT_DEVIATION: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeRule {
    /// Latest session volume above the trailing average.
    Relative,
    /// Trailing average volume above the threshold.
    AverageAbove(u64),
    /// Latest session volume above the threshold.
    DailyAbove(u64),
}

impl VolumeRule {
    pub fn check(&self, stats: &VolumeStats) -> bool {
        match *self {
            VolumeRule::Relative => {
                stats.latest_session_volume as f64 > stats.trailing_average_volume
            }
            VolumeRule::AverageAbove(threshold) => stats.trailing_average_volume > threshold as f64,
            VolumeRule::DailyAbove(threshold) => stats.latest_session_volume > threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeMode {
    Inside,
    Ranging { deviation: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterSpec {
    Volume(VolumeRule),
    InsideRange {
        num: usize,
        interval: Interval,
        period: Period,
        mode: RangeMode,
    },
    Base {
        deviation: f64,
        interval: Interval,
        period: Period,
    },
}

impl FilterSpec {
    /// Build a volume filter.
    ///
    /// Without both a threshold and a comparison target the filter compares
    /// the latest session against the trailing average. `compare` accepts
    /// `average`/`avg` or `daily`.
    pub fn volume(threshold: Option<u64>, compare: Option<&str>) -> Result<Self, ScreenerError> {
        let compare = compare.map(str::trim).filter(|c| !c.is_empty());
        let rule = match (threshold, compare) {
            (Some(threshold), Some(target)) => match target.to_lowercase().as_str() {
                "average" | "avg" => VolumeRule::AverageAbove(threshold),
                "daily" => VolumeRule::DailyAbove(threshold),
                other => {
                    return Err(ScreenerError::invalid_parameter(
                        "compare",
                        format!("expected 'average' or 'daily', got '{other}'"),
                    ));
                }
            },
            _ => VolumeRule::Relative,
        };
        Ok(FilterSpec::Volume(rule))
    }

    /// Build an inside-bar or ranging filter.
    ///
    /// `mode` is `inside` or `ranging`; `deviation` only applies to ranging
    /// and defaults to [`DEFAULT_DEVIATION`].
    pub fn inside_range(
        num: i64,
        interval: &str,
        mode: &str,
        deviation: Option<f64>,
        period: Period,
    ) -> Result<Self, ScreenerError> {
        let num = parse_num(num)?;
        let interval = parse_interval(interval)?;
        let mode = match mode.trim().to_lowercase().as_str() {
            "inside" => RangeMode::Inside,
            "ranging" => {
                let deviation = deviation.unwrap_or(DEFAULT_DEVIATION);
                check_deviation(deviation)?;
                RangeMode::Ranging { deviation }
            }
            other => {
                return Err(ScreenerError::invalid_parameter(
                    "mode",
                    format!("expected 'inside' or 'ranging', got '{other}'"),
                ));
            }
        };
        Ok(FilterSpec::InsideRange {
            num,
            interval,
            period,
            mode,
        })
    }

    pub fn base(deviation: f64, interval: &str, period: Period) -> Result<Self, ScreenerError> {
        check_deviation(deviation)?;
        Ok(FilterSpec::Base {
            deviation,
            interval: parse_interval(interval)?,
            period,
        })
    }

    /// The series request this filter needs, if any.
    pub fn series_request(&self) -> Option<(Period, Interval)> {
        match self {
            FilterSpec::Volume(_) => None,
            FilterSpec::InsideRange {
                interval, period, ..
            }
            | FilterSpec::Base {
                interval, period, ..
            } => Some((*period, *interval)),
        }
    }

    /// Apply a series-based filter to already fetched bars.
    pub fn check_series(&self, series: &Series) -> Result<bool, PatternError> {
        match self {
            FilterSpec::InsideRange { num, mode, .. } => {
                let lows = series.lows();
                let highs = series.highs();
                match mode {
                    RangeMode::Inside => pattern::inside_bars(&lows, &highs, *num),
                    RangeMode::Ranging { deviation } => {
                        pattern::ranging(&lows, &highs, *num, *deviation)
                    }
                }
            }
            FilterSpec::Base { deviation, .. } => {
                pattern::base_formation(&series.closes(), *deviation)
            }
            FilterSpec::Volume(_) => Err(PatternError::InvalidParameter {
                name: "filter".into(),
                reason: "volume filters are not evaluated on price series".into(),
            }),
        }
    }

    /// Fetch whatever this filter needs for `symbol` and decide.
    pub fn evaluate(&self, symbol: &str, data: &dyn MarketDataPort) -> Verdict {
        let outcome = match self {
            FilterSpec::Volume(rule) => data.fetch_volume(symbol).map(|stats| rule.check(&stats)),
            FilterSpec::InsideRange {
                interval, period, ..
            }
            | FilterSpec::Base {
                interval, period, ..
            } => data
                .fetch_series(symbol, *period, *interval)
                .and_then(|series| {
                    self.check_series(&series)
                        .map_err(|e| ScreenerError::from_pattern(symbol, e))
                }),
        };

        match outcome {
            Ok(true) => Verdict::Pass,
            Ok(false) => Verdict::Fail,
            Err(e) => Verdict::Indeterminate(e),
        }
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterSpec::Volume(VolumeRule::Relative) => write!(f, "volume(daily > average)"),
            FilterSpec::Volume(VolumeRule::AverageAbove(t)) => write!(f, "volume(average > {t})"),
            FilterSpec::Volume(VolumeRule::DailyAbove(t)) => write!(f, "volume(daily > {t})"),
            FilterSpec::InsideRange {
                num,
                interval,
                period,
                mode: RangeMode::Inside,
            } => write!(f, "inside(num={num}, interval={interval}, period={period})"),
            FilterSpec::InsideRange {
                num,
                interval,
                period,
                mode: RangeMode::Ranging { deviation },
            } => write!(
                f,
                "ranging(num={num}, deviation={deviation}, interval={interval}, period={period})"
            ),
            FilterSpec::Base {
                deviation,
                interval,
                period,
            } => write!(
                f,
                "base(deviation={deviation}, interval={interval}, period={period})"
            ),
        }
    }
}

/// Outcome of applying one filter to one symbol.
#[derive(Debug)]
pub enum Verdict {
    Pass,
    Fail,
    /// The filter could not be checked; treated as a failure by the pipeline.
    Indeterminate(ScreenerError),
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

fn parse_num(num: i64) -> Result<usize, ScreenerError> {
    if num < 1 {
        return Err(ScreenerError::invalid_parameter(
            "num",
            format!("must be at least 1, got {num}"),
        ));
    }
    usize::try_from(num).map_err(|_| ScreenerError::invalid_parameter("num", "out of range"))
}

fn parse_interval(interval: &str) -> Result<Interval, ScreenerError> {
    interval
        .parse()
        .map_err(|e: crate::domain::interval::IntervalError| {
            ScreenerError::invalid_parameter("interval", e.to_string())
        })
}

fn check_deviation(deviation: f64) -> Result<(), ScreenerError> {
    if !deviation.is_finite() || deviation < 0.0 {
        return Err(ScreenerError::invalid_parameter(
            "deviation",
            format!("must be a non-negative number, got {deviation}"),
        ));
    }
    Ok(())
}
