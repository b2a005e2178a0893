//! Opening-hours window.
//!
//! Hours are coerced from raw form text the moment a field changes. Blank or
//! non-numeric input becomes NaN instead of an error, and NaN travels to the
//! backend as JSON `null`.

use serde::{Deserialize, Deserializer, Serialize};

/// Coerce raw form text into an hour value.
///
/// Never fails: blank or non-numeric input yields `f64::NAN`.
///
/// ```
/// use seller_dashboard_core::coerce_hour;
///
/// assert_eq!(coerce_hour("8"), 8.0);
/// assert_eq!(coerce_hour(" 18 "), 18.0);
/// assert!(coerce_hour("").is_nan());
/// assert!(coerce_hour("eight").is_nan());
/// ```
#[must_use]
pub fn coerce_hour(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// One end of an [`OpeningHours`] window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HourField {
    Start,
    End,
}

impl std::str::FromStr for HourField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            other => Err(format!("unknown opening-hours field: {other}")),
        }
    }
}

/// The seller's order-acceptance window, as hours of the day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OpeningHours {
    /// Opening hour.
    #[serde(default = "unset_hour", deserialize_with = "nan_when_null")]
    pub start: f64,
    /// Closing hour.
    #[serde(default = "unset_hour", deserialize_with = "nan_when_null")]
    pub end: f64,
}

impl OpeningHours {
    /// Create a window from two hour values.
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// A window with neither hour filled in.
    #[must_use]
    pub const fn unset() -> Self {
        Self {
            start: f64::NAN,
            end: f64::NAN,
        }
    }

    /// Coerce `input` and store it in `field`.
    pub fn set(&mut self, field: HourField, input: &str) {
        let value = coerce_hour(input);
        match field {
            HourField::Start => self.start = value,
            HourField::End => self.end = value,
        }
    }

    /// Whether both hours are finite values in `0..=24` with `start < end`.
    ///
    /// Informational only; submission is never blocked on it.
    #[must_use]
    pub fn is_valid_window(&self) -> bool {
        let in_day = |h: f64| h.is_finite() && (0.0..=24.0).contains(&h);
        in_day(self.start) && in_day(self.end) && self.start < self.end
    }
}

impl Default for OpeningHours {
    fn default() -> Self {
        Self::unset()
    }
}

// NaN != NaN, so compare bit patterns for the unset case.
impl PartialEq for OpeningHours {
    fn eq(&self, other: &Self) -> bool {
        same_hour(self.start, other.start) && same_hour(self.end, other.end)
    }
}

fn same_hour(a: f64, b: f64) -> bool {
    (a.is_nan() && b.is_nan()) || a == b
}

const fn unset_hour() -> f64 {
    f64::NAN
}

fn nan_when_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
