//! Normalization of human-readable completion times.
//!
//! The reference source publishes durations as display strings like
//! `"7½ Hours"` or `"--"` when it has nothing. Everything downstream
//! (sorting, aggregation) wants a number, so this module owns the one
//! conversion point.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The `--` placeholder the reference source uses for "no data".
pub const PLACEHOLDER: &str = "--";

/// An hour figure that may be unknown.
///
/// Unknown is a first-class state here, not zero: a game that genuinely
/// takes 0 hours and a game with no published estimate must never compare
/// equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourValue {
    /// A known, non-negative number of hours.
    Known(f64),
    /// No usable estimate.
    Unknown,
}

impl HourValue {
    /// The numeric hours, if known.
    pub fn hours(&self) -> Option<f64> {
        match self {
            Self::Known(h) => Some(*h),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for HourValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(h) => write!(f, "{}h", h),
            Self::Unknown => write!(f, "{}", PLACEHOLDER),
        }
    }
}

/// Parse a raw duration string into an [`HourValue`].
///
/// Handles the forms the reference source actually emits:
/// - `"--"`, empty, or whitespace → unknown
/// - an optional trailing `Hour`/`Hours` unit word (any case) is stripped
/// - a trailing `½` adds 0.5; the glyph alone means half an hour
/// - anything else parses as a decimal number, or falls back to unknown
///
/// Pure and infallible: malformed input is unknown, never an error.
pub fn parse_hours(raw: &str) -> HourValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == PLACEHOLDER {
        return HourValue::Unknown;
    }

    // Strip a trailing unit word, case-insensitively.
    let lower = trimmed.to_lowercase();
    let without_unit = if let Some(stripped) = lower.strip_suffix("hours") {
        stripped
    } else if let Some(stripped) = lower.strip_suffix("hour") {
        stripped
    } else {
        lower.as_str()
    };
    let number = without_unit.trim();

    if let Some(base) = number.strip_suffix('½') {
        let base = base.trim();
        // The glyph alone means "½ Hours".
        if base.is_empty() {
            return HourValue::Known(0.5);
        }
        return match base.parse::<f64>() {
            Ok(n) if n >= 0.0 => HourValue::Known(n + 0.5),
            _ => HourValue::Unknown,
        };
    }

    match number.parse::<f64>() {
        Ok(n) if n >= 0.0 => HourValue::Known(n),
        _ => HourValue::Unknown,
    }
}
