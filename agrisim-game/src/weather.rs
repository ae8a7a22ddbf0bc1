//! Weather preprocessing: rainfall labels, evapotranspiration and the soil water balance.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::INITIAL_WATER_FRACTION;
use crate::crop::CropKind;
use crate::error::SimError;
use crate::evapotranspiration::daily_et0;
use crate::numbers::{clamp_range, non_negative_or_zero, round_to};
use crate::rainfall::{RainfallLabel, ThresholdTable};

const fn default_display_decimals() -> u32 {
    2
}

/// Complete weather preprocessing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub threshold_table: ThresholdTable,
    pub field_capacity_mm: f64,
    pub default_crop_coefficient: f64,
    #[serde(default)]
    pub crop_coefficients: HashMap<CropKind, f64>,
    #[serde(default = "default_display_decimals")]
    pub display_decimals: u32,
}

impl WeatherConfig {
    /// Load weather configuration from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON string cannot be parsed or if validation fails.
    pub fn from_json(json_str: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json_str)
            .map_err(|e| SimError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SimError> {
        if !self.field_capacity_mm.is_finite() || self.field_capacity_mm <= 0.0 {
            return Err(SimError::Config(format!(
                "field capacity must be positive, got {}",
                self.field_capacity_mm
            )));
        }
        let coefficients = self
            .crop_coefficients
            .iter()
            .map(|(crop, kc)| (crop.label(), *kc))
            .chain(std::iter::once(("default", self.default_crop_coefficient)));
        for (name, kc) in coefficients {
            if !kc.is_finite() || kc < 0.0 {
                return Err(SimError::Config(format!(
                    "crop coefficient for {name} must be >= 0"
                )));
            }
        }
        Ok(())
    }

    /// Get embedded default configuration if loading fails
    #[must_use]
    pub fn default_config() -> Self {
        Self::from_json(include_str!("../assets/data/weather.json")).unwrap_or_else(|_| Self {
            threshold_table: ThresholdTable::FourLevel,
            field_capacity_mm: 100.0,
            default_crop_coefficient: 1.0,
            crop_coefficients: HashMap::new(),
            display_decimals: default_display_decimals(),
        })
    }

    /// Crop coefficient, falling back to the default for unknown crops.
    #[must_use]
    pub fn crop_coefficient(&self, crop: CropKind) -> f64 {
        self.crop_coefficients
            .get(&crop)
            .copied()
            .unwrap_or(self.default_crop_coefficient)
    }

    /// Soil water in millimetres expressed as a percentage of field capacity.
    #[must_use]
    pub fn water_to_percent(&self, water_mm: f64) -> f64 {
        clamp_range(water_mm / self.field_capacity_mm * 100.0, 0.0, 100.0)
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

/// One day of upstream observations, before any derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub precipitation_mm: Option<f64>,
    #[serde(default)]
    pub t_min_c: Option<f64>,
    #[serde(default)]
    pub t_max_c: Option<f64>,
}

impl RawDay {
    #[must_use]
    pub const fn new(
        date: NaiveDate,
        precipitation_mm: Option<f64>,
        t_min_c: Option<f64>,
        t_max_c: Option<f64>,
    ) -> Self {
        Self {
            date,
            precipitation_mm,
            t_min_c,
            t_max_c,
        }
    }

    fn precipitation(&self) -> f64 {
        self.precipitation_mm.map_or(0.0, non_negative_or_zero)
    }

    fn temperatures(&self) -> (Option<f64>, Option<f64>) {
        let finite = |v: Option<f64>| v.filter(|t| t.is_finite());
        (finite(self.t_min_c), finite(self.t_max_c))
    }
}

/// Fully derived record for one simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    /// 1-based day index within the season.
    pub day: u32,
    pub date: NaiveDate,
    pub precipitation_mm: f64,
    pub t_min_c: Option<f64>,
    pub t_max_c: Option<f64>,
    pub rainfall: RainfallLabel,
    pub et0_mm: f64,
    pub soil_water_mm: f64,
}

/// Output of [`preprocess`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherOutlook {
    pub crop: CropKind,
    pub latitude: f64,
    pub rainfall_labels: Vec<RainfallLabel>,
    pub soil_moisture_series: Vec<f64>,
    pub evapotranspiration_series: Vec<f64>,
    pub days: Vec<DailyWeather>,
}

impl WeatherOutlook {
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Derive labels, ETo and the running soil water balance for a raw series.
///
/// Never fails: malformed precipitation counts as zero and days without both
/// temperatures contribute no evapotranspiration.
#[must_use]
pub fn preprocess(
    series: &[RawDay],
    latitude: f64,
    crop: CropKind,
    cfg: &WeatherConfig,
) -> WeatherOutlook {
    let capacity = cfg.field_capacity_mm;
    let kc = cfg.crop_coefficient(crop);
    let decimals = cfg.display_decimals;
    let mut water = capacity * INITIAL_WATER_FRACTION;

    let mut days = Vec::with_capacity(series.len());
    for (idx, raw) in series.iter().enumerate() {
        let precipitation = raw.precipitation();
        let (t_min, t_max) = raw.temperatures();
        let rainfall = cfg.threshold_table.classify(precipitation);
        let et0 = daily_et0(raw.date, latitude, t_min, t_max);

        water += precipitation;
        water -= water.min(et0 * kc);
        water = clamp_range(water, 0.0, capacity);

        days.push(DailyWeather {
            day: u32::try_from(idx + 1).unwrap_or(u32::MAX),
            date: raw.date,
            precipitation_mm: precipitation,
            t_min_c: t_min,
            t_max_c: t_max,
            rainfall,
            et0_mm: round_to(et0, decimals),
            soil_water_mm: round_to(water, decimals),
        });
    }

    log::debug!(
        "preprocessed {} days for {crop} at lat {latitude:.2} (kc {kc:.2})",
        days.len()
    );

    WeatherOutlook {
        crop,
        latitude,
        rainfall_labels: days.iter().map(|d| d.rainfall).collect(),
        soil_moisture_series: days.iter().map(|d| d.soil_water_mm).collect(),
        evapotranspiration_series: days.iter().map(|d| d.et0_mm).collect(),
        days,
    }
}
