//! Centralized balance and tuning constants for Agrisim game logic.
//!
//! These values define the deterministic math for the daily step rule and the
//! weather preprocessor. Costs, starting values and the price band live in
//! [`crate::config::SimConfig`] instead, since they are tuned per classroom.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_IRRIGATE: &str = "log.action.irrigate";
pub(crate) const LOG_IRRIGATE_WASTED: &str = "log.action.irrigate.wasted";
pub(crate) const LOG_FERTILIZE: &str = "log.action.fertilize";
pub(crate) const LOG_FERTILIZE_RUNOFF: &str = "log.action.fertilize.runoff";
pub(crate) const LOG_SCOUT: &str = "log.action.scout";
pub(crate) const LOG_WAIT: &str = "log.action.wait";
pub(crate) const LOG_SEASON_COMPLETE: &str = "log.season.complete";

// Rain-driven soil moisture deltas ----------------------------------------
pub(crate) const RAIN_DELTA_NONE: f64 = -7.0;
pub(crate) const RAIN_DELTA_LOW: f64 = -5.0;
pub(crate) const RAIN_DELTA_MEDIUM: f64 = 6.0;
pub(crate) const RAIN_DELTA_HIGH: f64 = 12.0;

// Action effects -----------------------------------------------------------
pub(crate) const IRRIGATE_MOISTURE_GAIN: f64 = 10.0;
pub(crate) const IRRIGATE_WET_DAY_PENALTY: f64 = 2.0;
pub(crate) const FERTILIZE_NITROGEN_GAIN: f64 = 12.0;
pub(crate) const FERTILIZE_RUNOFF_PENALTY: f64 = 3.0;
pub(crate) const SCOUT_PEST_REDUCTION_MIN: u32 = 5;
pub(crate) const SCOUT_PEST_REDUCTION_MAX: u32 = 15;

// Passive pest growth ------------------------------------------------------
pub(crate) const PEST_GROWTH_RANDOM_MAX: u32 = 5;
pub(crate) const PEST_GROWTH_STRESS_DIVISOR: f64 = 20.0;

// Crop health weights ------------------------------------------------------
pub(crate) const HEALTH_MOISTURE_WEIGHT: f64 = 0.4;
pub(crate) const HEALTH_NITROGEN_WEIGHT: f64 = 0.4;
pub(crate) const HEALTH_PEST_WEIGHT: f64 = 0.2;
pub(crate) const HEALTH_NORMALIZER: f64 = 1.5;

// Revenue tiers ------------------------------------------------------------
pub(crate) const REVENUE_HIGH_HEALTH: f64 = 70.0;
pub(crate) const REVENUE_MID_HEALTH: f64 = 40.0;
pub(crate) const REVENUE_HIGH_UNITS: f64 = 4.0;
pub(crate) const REVENUE_MID_UNITS: f64 = 2.0;

// Market -------------------------------------------------------------------
pub(crate) const MARKET_DRIFT: f64 = 0.05;

// Percentage fields --------------------------------------------------------
pub const PERCENT_MIN: f64 = 0.0;
pub const PERCENT_MAX: f64 = 100.0;

// Hargreaves / FAO-56 ------------------------------------------------------
pub(crate) const SOLAR_CONSTANT_MJ: f64 = 0.0820;
pub(crate) const HARGREAVES_COEFFICIENT: f64 = 0.0023;
pub(crate) const HARGREAVES_TEMP_OFFSET: f64 = 17.8;
pub(crate) const DAYS_PER_YEAR: f64 = 365.0;
pub(crate) const INITIAL_WATER_FRACTION: f64 = 0.5;

// Season verdict -----------------------------------------------------------
pub(crate) const VERDICT_SUSTAINABLE_MIN: f64 = 70.0;
pub(crate) const SCORE_PROFIT_WEIGHT: f64 = 10.0;
