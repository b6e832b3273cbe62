//! Sampling intervals and lookback periods.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntervalError {
    #[error("unknown interval: {0}")]
    UnknownInterval(String),

    #[error("unknown period: {0}")]
    UnknownPeriod(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    OneMinute,
    TwoMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    SixtyMinutes,
    NinetyMinutes,
    OneHour,
    OneDay,
    FiveDays,
    OneWeek,
    OneMonth,
    ThreeMonths,
}

impl Interval {
    pub const ALL: [Interval; 13] = [
        Interval::OneMinute,
        Interval::TwoMinutes,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::SixtyMinutes,
        Interval::NinetyMinutes,
        Interval::OneHour,
        Interval::OneDay,
        Interval::FiveDays,
        Interval::OneWeek,
        Interval::OneMonth,
        Interval::ThreeMonths,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::TwoMinutes => "2m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::SixtyMinutes => "60m",
            Interval::NinetyMinutes => "90m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::FiveDays => "5d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
            Interval::ThreeMonths => "3mo",
        }
    }

    /// Intervals that can be built by aggregating daily bars.
    pub fn is_resampled_from_daily(&self) -> bool {
        matches!(
            self,
            Interval::FiveDays | Interval::OneWeek | Interval::OneMonth | Interval::ThreeMonths
        )
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        Interval::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == trimmed)
            .ok_or(IntervalError::UnknownInterval(trimmed))
    }
}

/// Total lookback span of a series request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Period {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// Earliest timestamp covered when the most recent bar is at `latest`.
    /// `None` means the whole history.
    pub fn cutoff(&self, latest: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Period::OneDay => latest.checked_sub_signed(TimeDelta::days(1)),
            Period::FiveDays => latest.checked_sub_signed(TimeDelta::days(5)),
            Period::OneMonth => latest.checked_sub_months(Months::new(1)),
            Period::ThreeMonths => latest.checked_sub_months(Months::new(3)),
            Period::SixMonths => latest.checked_sub_months(Months::new(6)),
            Period::OneYear => latest.checked_sub_months(Months::new(12)),
            Period::TwoYears => latest.checked_sub_months(Months::new(24)),
            Period::FiveYears => latest.checked_sub_months(Months::new(60)),
            Period::TenYears => latest.checked_sub_months(Months::new(120)),
            Period::YearToDate => NaiveDate::from_ymd_opt(latest.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            Period::Max => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        Period::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == trimmed)
            .ok_or(IntervalError::UnknownPeriod(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn every_interval_round_trips_through_its_label() {
        for interval in Interval::ALL {
            assert_eq!(interval.as_str().parse::<Interval>(), Ok(interval));
        }
    }

    #[test]
    fn sixty_minutes_and_one_hour_are_distinct() {
        assert_eq!("60m".parse::<Interval>(), Ok(Interval::SixtyMinutes));
        assert_eq!("1h".parse::<Interval>(), Ok(Interval::OneHour));
    }

    #[test]
    fn unknown_interval_rejected() {
        assert_eq!(
            "1y".parse::<Interval>(),
            Err(IntervalError::UnknownInterval("1y".into()))
        );
        assert!("".parse::<Interval>().is_err());
    }

    #[test]
    fn interval_parse_is_case_insensitive() {
        assert_eq!("1D".parse::<Interval>(), Ok(Interval::OneDay));
        assert_eq!(" 1WK".parse::<Interval>(), Ok(Interval::OneWeek));
        assert_eq!("3Mo".parse::<Interval>(), Ok(Interval::ThreeMonths));
    }

    #[test]
    fn resampled_intervals() {
        assert!(Interval::OneWeek.is_resampled_from_daily());
        assert!(Interval::ThreeMonths.is_resampled_from_daily());
        assert!(!Interval::OneDay.is_resampled_from_daily());
        assert!(!Interval::FiveMinutes.is_resampled_from_daily());
    }

    #[test]
    fn period_parse_is_case_insensitive() {
        assert_eq!("YTD".parse::<Period>(), Ok(Period::YearToDate));
        assert_eq!(" 1y ".parse::<Period>(), Ok(Period::OneYear));
        assert!("1w".parse::<Period>().is_err());
    }

    #[test]
    fn period_cutoffs() {
        let latest = at(2024, 3, 31);
        assert_eq!(Period::OneYear.cutoff(latest), Some(at(2023, 3, 31)));
        assert_eq!(Period::OneMonth.cutoff(latest), Some(at(2024, 2, 29)));
        assert_eq!(Period::FiveDays.cutoff(latest), Some(at(2024, 3, 26)));
        assert_eq!(Period::YearToDate.cutoff(latest), Some(at(2024, 1, 1)));
        assert_eq!(Period::Max.cutoff(latest), None);
    }

    #[test]
    fn default_period_is_one_year() {
        assert_eq!(Period::default(), Period::OneYear);
    }
}
