//! Rainfall intensity labels and the threshold tables that produce them.
use serde::{Deserialize, Serialize};

use crate::constants::{RAIN_DELTA_HIGH, RAIN_DELTA_LOW, RAIN_DELTA_MEDIUM, RAIN_DELTA_NONE};
use crate::numbers::non_negative_or_zero;

/// Discretized daily rainfall intensity, ordered from driest to wettest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum RainfallLabel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl RainfallLabel {
    pub const ALL: [Self; 4] = [Self::None, Self::Low, Self::Medium, Self::High];

    /// Soil moisture change applied at the start of every step.
    #[must_use]
    pub const fn moisture_delta(self) -> f64 {
        match self {
            Self::None => RAIN_DELTA_NONE,
            Self::Low => RAIN_DELTA_LOW,
            Self::Medium => RAIN_DELTA_MEDIUM,
            Self::High => RAIN_DELTA_HIGH,
        }
    }

    /// Whether rain alone already waters the field.
    #[must_use]
    pub const fn is_wet(self) -> bool {
        matches!(self, Self::Medium | Self::High)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Number of raindrops a renderer should draw for this label.
    #[must_use]
    pub const fn drop_count(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Low => 40,
            Self::Medium => 120,
            Self::High => 260,
        }
    }
}

impl std::fmt::Display for RainfallLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cutoff tables mapping millimetres of precipitation to a label.
///
/// Exactly one table is applied to a whole series; the two are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdTable {
    /// `0 → none`, `< 3 → low`, `< 10 → medium`, otherwise `high`.
    #[default]
    FourLevel,
    /// No dry tier: `< 2 → low`, `< 8 → medium`, otherwise `high`.
    ThreeLevel,
}

impl ThresholdTable {
    /// Classify a precipitation amount. Pure and monotonic in `precipitation_mm`.
    #[must_use]
    pub fn classify(self, precipitation_mm: f64) -> RainfallLabel {
        let p = non_negative_or_zero(precipitation_mm);
        match self {
            Self::FourLevel => {
                if p == 0.0 {
                    RainfallLabel::None
                } else if p < 3.0 {
                    RainfallLabel::Low
                } else if p < 10.0 {
                    RainfallLabel::Medium
                } else {
                    RainfallLabel::High
                }
            }
            Self::ThreeLevel => {
                if p < 2.0 {
                    RainfallLabel::Low
                } else if p < 8.0 {
                    RainfallLabel::Medium
                } else {
                    RainfallLabel::High
                }
            }
        }
    }
}

/// Classify with the canonical four-level table.
#[must_use]
pub fn classify_rainfall(precipitation_mm: f64) -> RainfallLabel {
    ThresholdTable::FourLevel.classify(precipitation_mm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_level_boundaries() {
        assert_eq!(classify_rainfall(0.0), RainfallLabel::None);
        assert_eq!(classify_rainfall(0.1), RainfallLabel::Low);
        assert_eq!(classify_rainfall(2.99), RainfallLabel::Low);
        assert_eq!(classify_rainfall(3.0), RainfallLabel::Medium);
        assert_eq!(classify_rainfall(9.99), RainfallLabel::Medium);
        assert_eq!(classify_rainfall(10.0), RainfallLabel::High);
        assert_eq!(classify_rainfall(250.0), RainfallLabel::High);
    }

    #[test]
    fn three_level_has_no_dry_tier() {
        let table = ThresholdTable::ThreeLevel;
        assert_eq!(table.classify(0.0), RainfallLabel::Low);
        assert_eq!(table.classify(2.0), RainfallLabel::Medium);
        assert_eq!(table.classify(8.0), RainfallLabel::High);
    }

    #[test]
    fn heavier_rain_draws_more_drops() {
        assert_eq!(RainfallLabel::None.drop_count(), 0);
        assert!(RainfallLabel::Low.drop_count() < RainfallLabel::Medium.drop_count());
        assert!(RainfallLabel::Medium.drop_count() < RainfallLabel::High.drop_count());
    }

    #[test]
    fn malformed_precipitation_is_dry() {
        assert_eq!(classify_rainfall(-4.0), RainfallLabel::None);
        assert_eq!(classify_rainfall(f64::NAN), RainfallLabel::None);
    }

    #[test]
    fn classification_is_monotonic_and_pure() {
        for table in [ThresholdTable::FourLevel, ThresholdTable::ThreeLevel] {
            let mut previous = table.classify(0.0);
            for step in 0..=600 {
                let p = f64::from(step) * 0.05;
                let label = table.classify(p);
                assert!(label >= previous, "{table:?} regressed at {p}");
                assert_eq!(label, table.classify(p));
                previous = label;
            }
        }
    }

    #[test]
    fn wet_labels_raise_moisture() {
        for label in RainfallLabel::ALL {
            assert_eq!(label.is_wet(), label.moisture_delta() > 0.0);
        }
    }
}
