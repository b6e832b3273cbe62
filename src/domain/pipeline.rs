//! Filter pipeline: AND-composition of filters over a candidate list.
//!
//! Every filter is applied to every candidate. A candidate passes only when
//! all verdicts are `Pass`; an indeterminate verdict excludes it and is
//! recorded as a [`Diagnostic`]. Candidate order is preserved in the output.

use crate::domain::error::ScreenerError;
use crate::domain::filter::{FilterSpec, Verdict};
use crate::ports::market_data_port::MarketDataPort;

/// A filter that could not be checked for a symbol.
#[derive(Debug)]
pub struct Diagnostic {
    pub symbol: String,
    pub filter: String,
    pub error: ScreenerError,
}

#[derive(Debug, Default)]
pub struct ScreenReport {
    pub passed: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub evaluated: usize,
    /// Candidates excluded by at least one definite `Fail`.
    pub failed: usize,
    /// Candidates excluded only because some filter was indeterminate.
    pub indeterminate: usize,
}

impl ScreenReport {
    pub fn diagnostics_for<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.symbol == symbol)
    }
}

pub fn screen(
    candidates: &[String],
    filters: &[FilterSpec],
    data: &dyn MarketDataPort,
) -> ScreenReport {
    let mut report = ScreenReport::default();

    for symbol in candidates {
        report.evaluated += 1;
        let mut any_fail = false;
        let mut any_indeterminate = false;

        for filter in filters {
            match filter.evaluate(symbol, data) {
                Verdict::Pass => {
                    tracing::debug!(%symbol, %filter, "pass");
                }
                Verdict::Fail => {
                    tracing::debug!(%symbol, %filter, "fail");
                    any_fail = true;
                }
                Verdict::Indeterminate(error) => {
                    tracing::warn!(%symbol, %filter, %error, "filter could not be evaluated");
                    any_indeterminate = true;
                    report.diagnostics.push(Diagnostic {
                        symbol: symbol.clone(),
                        filter: filter.to_string(),
                        error,
                    });
                }
            }
        }

        data.end_symbol(symbol);

        if any_fail {
            report.failed += 1;
        } else if any_indeterminate {
            report.indeterminate += 1;
        } else {
            report.passed.push(symbol.clone());
        }
    }

    tracing::info!(
        evaluated = report.evaluated,
        passed = report.passed.len(),
        failed = report.failed,
        indeterminate = report.indeterminate,
        "screen complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::{Series, VolumeStats};
    use crate::domain::interval::{Interval, Period};
    use std::collections::HashMap;

    struct VolumeOnly {
        stats: HashMap<String, VolumeStats>,
    }

    impl MarketDataPort for VolumeOnly {
        fn fetch_series(
            &self,
            symbol: &str,
            _period: Period,
            _interval: Interval,
        ) -> Result<Series, ScreenerError> {
            Err(ScreenerError::data_unavailable(symbol, "no series"))
        }

        fn fetch_volume(&self, symbol: &str) -> Result<VolumeStats, ScreenerError> {
            self.stats
                .get(symbol)
                .copied()
                .ok_or_else(|| ScreenerError::data_unavailable(symbol, "unknown symbol"))
        }
    }

    fn data() -> VolumeOnly {
        let mut stats = HashMap::new();
        stats.insert(
            "HOT".to_string(),
            VolumeStats {
                latest_session_volume: 2_000_000,
                trailing_average_volume: 1_500_000.0,
            },
        );
        stats.insert(
            "COLD".to_string(),
            VolumeStats {
                latest_session_volume: 1_500_000,
                trailing_average_volume: 2_000_000.0,
            },
        );
        VolumeOnly { stats }
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_filters_pass_everything() {
        let candidates = symbols(&["HOT", "COLD", "MISSING"]);
        let report = screen(&candidates, &[], &data());
        assert_eq!(report.passed, candidates);
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.evaluated, 3);
    }

    #[test]
    fn relative_volume_screen() {
        let filters = vec![FilterSpec::volume(None, None).unwrap()];
        let report = screen(&symbols(&["COLD", "HOT"]), &filters, &data());
        assert_eq!(report.passed, vec!["HOT"]);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn indeterminate_excludes_and_is_recorded() {
        let filters = vec![FilterSpec::volume(None, None).unwrap()];
        let report = screen(&symbols(&["MISSING", "HOT"]), &filters, &data());
        assert_eq!(report.passed, vec!["HOT"]);
        assert_eq!(report.indeterminate, 1);
        assert_eq!(report.diagnostics.len(), 1);
        let diag = &report.diagnostics[0];
        assert_eq!(diag.symbol, "MISSING");
        assert_eq!(diag.filter, "volume(daily > average)");
        assert!(matches!(diag.error, ScreenerError::DataUnavailable { .. }));
    }

    #[test]
    fn all_filters_run_after_a_failure() {
        // volume fails for COLD, the base filter still runs and is indeterminate
        let filters = vec![
            FilterSpec::volume(None, None).unwrap(),
            FilterSpec::base(0.05, "1d", Period::OneYear).unwrap(),
        ];
        let report = screen(&symbols(&["COLD"]), &filters, &data());
        assert!(report.passed.is_empty());
        assert_eq!(report.failed, 1);
        assert_eq!(report.indeterminate, 0);
        assert_eq!(report.diagnostics_for("COLD").count(), 1);
    }

    #[test]
    fn filter_order_does_not_change_result() {
        let a = FilterSpec::volume(None, None).unwrap();
        let b = FilterSpec::volume(Some(1_000_000), Some("average")).unwrap();
        let candidates = symbols(&["HOT", "COLD", "MISSING"]);
        let forward = screen(&candidates, &[a.clone(), b.clone()], &data());
        let backward = screen(&candidates, &[b, a], &data());
        assert_eq!(forward.passed, backward.passed);
    }
}
