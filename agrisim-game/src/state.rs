//! Farm state record and the actions that evolve it.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::{PriceBand, SimConfig};
use crate::constants::{
    HEALTH_MOISTURE_WEIGHT, HEALTH_NITROGEN_WEIGHT, HEALTH_NORMALIZER, HEALTH_PEST_WEIGHT,
    PERCENT_MAX, PERCENT_MIN,
};
use crate::numbers::{clamp_range, round_f64_to_i32};

/// Actions recorded for a single day, stored inline for the common case.
pub type ActionLog = SmallVec<[Action; 4]>;

/// Daily decision a player can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Irrigate,
    Fertilize,
    Scout,
    Wait,
}

impl Action {
    pub const ALL: [Self; 4] = [Self::Irrigate, Self::Fertilize, Self::Scout, Self::Wait];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Irrigate => "irrigate",
            Self::Fertilize => "fertilize",
            Self::Scout => "scout",
            Self::Wait => "wait",
        }
    }

    /// Phrase used in messages ("cannot scout for pests ...").
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Irrigate => "irrigate",
            Self::Fertilize => "fertilize",
            Self::Scout => "scout for pests",
            Self::Wait => "wait",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.label().eq_ignore_ascii_case(value.trim()))
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Crop health as a weighted function of moisture, nitrogen and pests.
#[must_use]
pub fn crop_health(soil_moisture: f64, nitrogen: f64, pest_pressure: f64) -> f64 {
    let weighted = soil_moisture * HEALTH_MOISTURE_WEIGHT
        + nitrogen * HEALTH_NITROGEN_WEIGHT
        + (PERCENT_MAX - pest_pressure) * HEALTH_PEST_WEIGHT;
    clamp_percent(weighted / HEALTH_NORMALIZER)
}

#[must_use]
pub(crate) fn clamp_percent(value: f64) -> f64 {
    clamp_range(value, PERCENT_MIN, PERCENT_MAX)
}

/// The single mutable entity of a season. Each step yields a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmState {
    pub day: u32,
    pub money: f64,
    pub sustainability: f64,
    crop_health: f64,
    pub soil_moisture: f64,
    pub nitrogen: f64,
    pub pest_pressure: f64,
    pub market_price: f64,
    #[serde(default)]
    pub actions_taken_today: ActionLog,
    /// Seed for today's rain animation.
    #[serde(default)]
    pub rain_seed: u64,
}

impl FarmState {
    /// Opening state for day 1.
    #[must_use]
    pub fn opening(cfg: &SimConfig, soil_moisture: f64) -> Self {
        let start = &cfg.start;
        let mut state = Self {
            day: 1,
            money: start.money,
            sustainability: start.sustainability,
            crop_health: 0.0,
            soil_moisture,
            nitrogen: start.nitrogen,
            pest_pressure: start.pest_pressure,
            market_price: start.market_price,
            actions_taken_today: ActionLog::new(),
            rain_seed: 0,
        };
        state.settle(cfg.price_band);
        state
    }

    /// Current crop health. Always derived, never assigned.
    #[must_use]
    pub const fn crop_health(&self) -> f64 {
        self.crop_health
    }

    /// Clamp every bounded field and recompute crop health.
    pub(crate) fn settle(&mut self, band: PriceBand) {
        self.soil_moisture = clamp_percent(self.soil_moisture);
        self.nitrogen = clamp_percent(self.nitrogen);
        self.pest_pressure = clamp_percent(self.pest_pressure);
        self.sustainability = clamp_percent(self.sustainability);
        self.market_price = clamp_range(self.market_price, band.min, band.max);
        self.recompute_health();
    }

    pub(crate) fn recompute_health(&mut self) {
        self.crop_health = crop_health(self.soil_moisture, self.nitrogen, self.pest_pressure);
    }

    /// Rounded view for display widgets.
    #[must_use]
    pub fn display(&self) -> StateDisplay {
        StateDisplay {
            day: self.day,
            money: format!("{:.2}", self.money),
            sustainability: round_f64_to_i32(self.sustainability),
            crop_health: round_f64_to_i32(self.crop_health),
            soil_moisture: round_f64_to_i32(self.soil_moisture),
            nitrogen: round_f64_to_i32(self.nitrogen),
            pest_pressure: round_f64_to_i32(self.pest_pressure),
            market_price: format!("{:.2}", self.market_price),
        }
    }

    /// Whether every bounded field lies within its range.
    #[must_use]
    pub fn is_within_bounds(&self, band: PriceBand) -> bool {
        let percent = |v: f64| (PERCENT_MIN..=PERCENT_MAX).contains(&v);
        percent(self.sustainability)
            && percent(self.crop_health)
            && percent(self.soil_moisture)
            && percent(self.nitrogen)
            && percent(self.pest_pressure)
            && (band.min..=band.max).contains(&self.market_price)
    }
}

/// Integer-rounded percentages as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDisplay {
    pub day: u32,
    pub money: String,
    pub sustainability: i32,
    pub crop_health: i32,
    pub soil_moisture: i32,
    pub nitrogen: i32,
    pub pest_pressure: i32,
    pub market_price: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_health_formula_is_exact() {
        for sm in [0.0_f64, 12.5, 55.0, 100.0] {
            for n in [0.0, 40.0, 77.7, 100.0] {
                for p in [0.0, 10.0, 63.2, 100.0] {
                    let expected =
                        ((sm * 0.4 + n * 0.4 + (100.0 - p) * 0.2) / 1.5).clamp(0.0, 100.0);
                    assert!((crop_health(sm, n, p) - expected).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn opening_state_derives_health() {
        let cfg = SimConfig::default_config();
        let state = FarmState::opening(&cfg, 55.0);
        assert_eq!(state.day, 1);
        assert!((state.crop_health() - crop_health(55.0, 40.0, 10.0)).abs() < 1e-12);
        assert!(state.actions_taken_today.is_empty());
        assert!(state.is_within_bounds(cfg.price_band));
    }

    #[test]
    fn opening_state_clamps_moisture() {
        let cfg = SimConfig::default_config();
        let state = FarmState::opening(&cfg, 180.0);
        assert!((state.soil_moisture - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serde_roundtrip_is_field_for_field() {
        let cfg = SimConfig::default_config();
        let mut state = FarmState::opening(&cfg, 47.123_456_789);
        state.money = -3.141_592_653_589_793;
        state.market_price = 1.234_567_890_123;
        state.actions_taken_today.push(Action::Irrigate);
        state.actions_taken_today.push(Action::Scout);
        state.rain_seed = 0xDEAD_BEEF;
        let json = serde_json::to_string(&state).unwrap();
        let back: FarmState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn display_rounds_percentages() {
        let cfg = SimConfig::default_config();
        let mut state = FarmState::opening(&cfg, 55.6);
        state.money = 7.005;
        let view = state.display();
        assert_eq!(view.soil_moisture, 56);
        assert_eq!(view.pest_pressure, 10);
    }

    #[test]
    fn actions_parse_case_insensitively() {
        assert_eq!(Action::parse("Irrigate"), Some(Action::Irrigate));
        assert_eq!(Action::parse(" WAIT "), Some(Action::Wait));
        assert_eq!(Action::parse("harvest"), None);
    }
}
