//! Price pattern predicates over chronological bar data.
//!
//! # Window Semantics
//!
//! `inside_bars` and `ranging` look at a trailing window of `num` bars that
//! ends one bar before the most recent one: for `k = num, num-1, .., 2` the
//! pair `(len-k-1, len-k)` is compared. The latest bar (the session still in
//! progress) never participates, so `num + 1` bars are required. `num == 1`
//! is vacuously true.
//!
//! - `inside_bars`: each bar strictly nested in its predecessor (`<` / `>`)
//! - `ranging`: each bar within a band widened by `deviation` (`<=` / `>=`),
//!   so at `deviation == 0` equal lows or highs pass where `inside_bars`
//!   rejects them
//! - `base_formation`: backward scan of closes against a band around the
//!   latest close

use crate::domain::error::PatternError;

/// Strictly narrowing ranges across the trailing window.
pub fn inside_bars(lows: &[f64], highs: &[f64], num: usize) -> Result<bool, PatternError> {
    trailing_pairs(lows, highs, num, |prev_low, low, prev_high, high| {
        prev_low < low && prev_high > high
    })
}

/// Tolerance-banded containment across the trailing window.
pub fn ranging(
    lows: &[f64],
    highs: &[f64],
    num: usize,
    deviation: f64,
) -> Result<bool, PatternError> {
    validate_deviation(deviation)?;
    trailing_pairs(lows, highs, num, |prev_low, low, prev_high, high| {
        prev_low * (1.0 - deviation) <= low && prev_high * (1.0 + deviation) >= high
    })
}

fn trailing_pairs<F>(
    lows: &[f64],
    highs: &[f64],
    num: usize,
    contains: F,
) -> Result<bool, PatternError>
where
    F: Fn(f64, f64, f64, f64) -> bool,
{
    if num == 0 {
        return Err(PatternError::InvalidParameter {
            name: "num".into(),
            reason: "must be at least 1".into(),
        });
    }
    if num == 1 {
        return Ok(true);
    }
    if lows.len() != highs.len() {
        return Err(PatternError::InvalidParameter {
            name: "highs".into(),
            reason: format!(
                "length {} does not match lows length {}",
                highs.len(),
                lows.len()
            ),
        });
    }

    let len = lows.len();
    let required = num + 1;
    if len < required {
        return Err(PatternError::InsufficientData {
            bars: len,
            required,
        });
    }

    for k in (2..=num).rev() {
        let prev = len - k - 1;
        let curr = len - k;
        if !contains(lows[prev], lows[curr], highs[prev], highs[curr]) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether price is basing at the level of the latest close.
///
/// Scans backward from the second-to-last close. A close inside
/// `[last * (1 - deviation), last * (1 + deviation)]` is a base; a close
/// above the band ends the scan with no base; closes below the band are
/// skipped. Running out of history without a verdict is `false`.
pub fn base_formation(closes: &[f64], deviation: f64) -> Result<bool, PatternError> {
    validate_deviation(deviation)?;
    let Some((&last, earlier)) = closes.split_last() else {
        return Err(PatternError::InsufficientData {
            bars: 0,
            required: 2,
        });
    };
    if earlier.is_empty() {
        return Err(PatternError::InsufficientData {
            bars: 1,
            required: 2,
        });
    }

    let upper = last * (1.0 + deviation);
    let lower = last * (1.0 - deviation);

    for &close in earlier.iter().rev() {
        if close > upper {
            return Ok(false);
        }
        if close >= lower {
            return Ok(true);
        }
    }
    Ok(false)
}

fn validate_deviation(deviation: f64) -> Result<(), PatternError> {
    if deviation.is_nan() || deviation < 0.0 {
        return Err(PatternError::InvalidParameter {
            name: "deviation".into(),
            reason: "must be a non-negative number".into(),
        });
    }
    Ok(())
}
