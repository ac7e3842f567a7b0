//! Tempo compatibility
//!
//! Direct match: `|a - b| / a <= tolerance`. With half/double-time matching
//! enabled, `a` may also match `2b` or `b/2` under the same test. The tempo
//! difference reported for scoring is always the direct gap between the
//! original values.

use serde::{Deserialize, Serialize};

/// Which comparison established compatibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempoMatch {
    Direct,
    /// `b` is played at double time (a ~ 2b)
    DoubleTime,
    /// `b` is played at half time (a ~ b/2)
    HalfTime,
}

/// Relative gap test, `tolerance_pct` in percent (10.0 = 10%)
fn within_tolerance(bpm_a: f64, bpm_b: f64, tolerance_pct: f64) -> bool {
    (bpm_a - bpm_b).abs() / bpm_a <= tolerance_pct / 100.0
}

/// Decide how (and whether) two tempos are compatible
pub fn tempo_match(bpm_a: f64, bpm_b: f64, tolerance_pct: f64, allow_halftime: bool) -> Option<TempoMatch> {
    if bpm_a <= 0.0 || bpm_b <= 0.0 {
        return None;
    }
    if within_tolerance(bpm_a, bpm_b, tolerance_pct) {
        return Some(TempoMatch::Direct);
    }
    if allow_halftime {
        if within_tolerance(bpm_a, bpm_b * 2.0, tolerance_pct) {
            return Some(TempoMatch::DoubleTime);
        }
        if within_tolerance(bpm_a, bpm_b / 2.0, tolerance_pct) {
            return Some(TempoMatch::HalfTime);
        }
    }
    None
}

pub fn bpm_compatible(bpm_a: f64, bpm_b: f64, tolerance_pct: f64, allow_halftime: bool) -> bool {
    tempo_match(bpm_a, bpm_b, tolerance_pct, allow_halftime).is_some()
}

/// Signed direct difference `b - a`
pub fn get_bpm_delta(bpm_a: f64, bpm_b: f64) -> f64 {
    bpm_b - bpm_a
}

/// Absolute direct difference, even when the match went through half/double time
pub fn get_bpm_difference(bpm_a: f64, bpm_b: f64) -> f64 {
    (bpm_b - bpm_a).abs()
}
