//! Engine configuration: action costs, starting values and the market band.
use serde::{Deserialize, Serialize};

use crate::constants::{PERCENT_MAX, PERCENT_MIN};
use crate::error::SimError;

/// Money deducted per action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCosts {
    pub irrigation: f64,
    pub fertilize: f64,
    pub scout: f64,
}

/// Values a fresh season starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartingValues {
    pub money: f64,
    pub sustainability: f64,
    /// Used only when the weather series is empty.
    pub soil_moisture: f64,
    pub nitrogen: f64,
    pub pest_pressure: f64,
    pub market_price: f64,
}

/// Inclusive band the market price drifts within.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub costs: ActionCosts,
    pub start: StartingValues,
    pub price_band: PriceBand,
}

impl SimConfig {
    /// Load engine configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or validation fails.
    pub fn from_json(json_str: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json_str)
            .map_err(|e| SimError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-range value.
    pub fn validate(&self) -> Result<(), SimError> {
        let costs = [
            ("irrigation", self.costs.irrigation),
            ("fertilize", self.costs.fertilize),
            ("scout", self.costs.scout),
        ];
        for (name, cost) in costs {
            if !cost.is_finite() || cost < 0.0 {
                return Err(SimError::Config(format!("cost {name} must be >= 0")));
            }
        }

        let band = self.price_band;
        if !band.min.is_finite() || !band.max.is_finite() || band.min > band.max {
            return Err(SimError::Config(format!(
                "price band [{}, {}] is empty",
                band.min, band.max
            )));
        }

        let percents = [
            ("sustainability", self.start.sustainability),
            ("soil_moisture", self.start.soil_moisture),
            ("nitrogen", self.start.nitrogen),
            ("pest_pressure", self.start.pest_pressure),
        ];
        for (name, value) in percents {
            if !(PERCENT_MIN..=PERCENT_MAX).contains(&value) {
                return Err(SimError::Config(format!(
                    "start.{name} = {value} is outside [0, 100]"
                )));
            }
        }
        if !(band.min..=band.max).contains(&self.start.market_price) {
            return Err(SimError::Config(format!(
                "start.market_price = {} is outside the price band",
                self.start.market_price
            )));
        }
        if !self.start.money.is_finite() {
            return Err(SimError::Config("start.money must be finite".to_string()));
        }
        Ok(())
    }

    /// Embedded default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self::from_json(include_str!("../assets/data/sim.json")).unwrap_or_else(|_| Self {
            costs: ActionCosts {
                irrigation: 2.0,
                fertilize: 3.0,
                scout: 1.0,
            },
            start: StartingValues {
                money: 10.0,
                sustainability: 100.0,
                soil_moisture: 55.0,
                nitrogen: 40.0,
                pest_pressure: 10.0,
                market_price: 1.0,
            },
            price_band: PriceBand { min: 0.8, max: 1.5 },
        })
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_validate() {
        let cfg = SimConfig::default_config();
        cfg.validate().unwrap();
        assert!((cfg.costs.irrigation - 2.0).abs() < f64::EPSILON);
        assert!((cfg.price_band.min - 0.8).abs() < f64::EPSILON);
        assert!((cfg.price_band.max - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_inverted_band_and_negative_cost() {
        let mut cfg = SimConfig::default_config();
        cfg.price_band = PriceBand { min: 2.0, max: 1.0 };
        assert!(matches!(cfg.validate(), Err(SimError::Config(_))));

        let mut cfg = SimConfig::default_config();
        cfg.costs.scout = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn from_json_reports_parse_errors() {
        let err = SimConfig::from_json("{ not json").unwrap_err();
        assert!(err.to_string().contains("JSON parse error"));
    }
}
