//! Building filters from configuration.
//!
//! `[filters] enabled` lists the filters to build, in order; each filter
//! reads its parameters from a section of the same name. `inside` and
//! `ranging` both read `[inside_range]` and only differ in the mode used
//! when that section sets none, so a section may be enabled once. Any
//! problem aborts setup before a single symbol is screened.

use crate::domain::error::ScreenerError;
use crate::domain::filter::{DEFAULT_DEVIATION, FilterSpec};
use crate::domain::interval::Period;
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Volume,
    InsideRange,
    Ranging,
    Base,
}

impl FilterKind {
    pub fn section(&self) -> &'static str {
        match self {
            FilterKind::Volume => "volume",
            FilterKind::InsideRange | FilterKind::Ranging => "inside_range",
            FilterKind::Base => "base",
        }
    }

    fn default_mode(&self) -> &'static str {
        match self {
            FilterKind::Ranging => "ranging",
            _ => "inside",
        }
    }
}

impl FromStr for FilterKind {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "volume" => Ok(FilterKind::Volume),
            "inside_range" | "inside" => Ok(FilterKind::InsideRange),
            "range" | "ranging" => Ok(FilterKind::Ranging),
            "base" => Ok(FilterKind::Base),
            other => Err(ScreenerError::invalid_parameter(
                "filters.enabled",
                format!("unknown filter '{other}' (expected volume, inside_range or base)"),
            )),
        }
    }
}

/// Parse the `[filters] enabled` list. A missing or blank list means no filters.
pub fn enabled_kinds(config: &dyn ConfigPort) -> Result<Vec<FilterKind>, ScreenerError> {
    let Some(list) = config.get_string("filters", "enabled") else {
        return Ok(Vec::new());
    };
    let mut kinds: Vec<FilterKind> = Vec::new();
    for token in list
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
    {
        let kind = FilterKind::from_str(token)?;
        if kinds.iter().any(|k| k.section() == kind.section()) {
            return Err(ScreenerError::invalid_parameter(
                "filters.enabled",
                format!("[{}] is enabled more than once", kind.section()),
            ));
        }
        kinds.push(kind);
    }
    Ok(kinds)
}

pub fn build_filters(
    config: &dyn ConfigPort,
    default_period: Period,
) -> Result<Vec<FilterSpec>, ScreenerError> {
    enabled_kinds(config)?
        .into_iter()
        .map(|kind| build_filter(config, kind, default_period))
        .collect()
}

pub fn build_filter(
    config: &dyn ConfigPort,
    kind: FilterKind,
    default_period: Period,
) -> Result<FilterSpec, ScreenerError> {
    let section = kind.section();
    match kind {
        FilterKind::Volume => {
            let threshold = optional_value::<i64>(config, section, "threshold")?
                .map(|t| {
                    u64::try_from(t).map_err(|_| {
                        ScreenerError::invalid_parameter("threshold", "must be non-negative")
                    })
                })
                .transpose()?;
            let compare = config.get_string(section, "compare");
            FilterSpec::volume(threshold, compare.as_deref())
        }
        FilterKind::InsideRange | FilterKind::Ranging => {
            let num = optional_value::<i64>(config, section, "num")?.ok_or_else(|| {
                ScreenerError::ConfigMissing {
                    section: section.to_string(),
                    key: "num".to_string(),
                }
            })?;
            let interval = string_or(config, section, "interval", "1d");
            let mode = string_or(config, section, "mode", kind.default_mode());
            let deviation = optional_value::<f64>(config, section, "deviation")?;
            let period = period_or(config, section, default_period)?;
            FilterSpec::inside_range(num, &interval, &mode, deviation, period)
        }
        FilterKind::Base => {
            let deviation =
                optional_value::<f64>(config, section, "deviation")?.unwrap_or(DEFAULT_DEVIATION);
            let interval = string_or(config, section, "interval", "1d");
            let period = period_or(config, section, default_period)?;
            FilterSpec::base(deviation, &interval, period)
        }
    }
}

/// Read `[section] key` and parse it, reporting unparsable values instead of
/// silently falling back to a default.
pub fn optional_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, ScreenerError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ScreenerError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("cannot parse '{}'", raw.trim()),
            }),
    }
}

fn string_or(config: &dyn ConfigPort, section: &str, key: &str, default: &str) -> String {
    config
        .get_string(section, key)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn period_or(
    config: &dyn ConfigPort,
    section: &str,
    default: Period,
) -> Result<Period, ScreenerError> {
    match config.get_string(section, "period") {
        Some(raw) if !raw.trim().is_empty() => raw.parse::<Period>().map_err(|e| {
            ScreenerError::invalid_parameter("period", format!("[{section}] {e}"))
        }),
        _ => Ok(default),
    }
}
