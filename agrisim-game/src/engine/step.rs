//! The daily step rule: pure functions from (state, action, rain) to the next state.
use rand::Rng;

use crate::config::SimConfig;
use crate::constants::{
    FERTILIZE_NITROGEN_GAIN, FERTILIZE_RUNOFF_PENALTY, IRRIGATE_MOISTURE_GAIN,
    IRRIGATE_WET_DAY_PENALTY, LOG_FERTILIZE, LOG_FERTILIZE_RUNOFF, LOG_IRRIGATE,
    LOG_IRRIGATE_WASTED, LOG_SCOUT, LOG_WAIT, MARKET_DRIFT, PERCENT_MAX,
    PEST_GROWTH_RANDOM_MAX, PEST_GROWTH_STRESS_DIVISOR, REVENUE_HIGH_HEALTH, REVENUE_HIGH_UNITS,
    REVENUE_MID_HEALTH, REVENUE_MID_UNITS, SCOUT_PEST_REDUCTION_MAX, SCOUT_PEST_REDUCTION_MIN,
};
use crate::numbers::u32_to_f64;
use crate::rainfall::RainfallLabel;
use crate::state::{Action, ActionLog, FarmState, clamp_percent};

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub state: FarmState,
    pub feedback: String,
    /// Logging key describing the dominant effect.
    pub log_key: &'static str,
    pub revenue: f64,
    pub pest_growth: f64,
    /// Pest pressure points drawn for removal by scouting, before clamping.
    pub scouted: Option<u32>,
}

/// Revenue earned for a given crop health at a market price.
#[must_use]
pub fn revenue_for(crop_health: f64, market_price: f64) -> f64 {
    if crop_health > REVENUE_HIGH_HEALTH {
        REVENUE_HIGH_UNITS * market_price
    } else if crop_health > REVENUE_MID_HEALTH {
        REVENUE_MID_UNITS * market_price
    } else {
        0.0
    }
}

/// Apply one action against today's rainfall.
///
/// Order: rain delta, action delta, passive pest growth, clamp, crop health,
/// revenue, market drift. Pest pressure is clamped after each change to it.
/// Random draws come only from `rng`.
pub fn apply_action<R: Rng + ?Sized>(
    state: &FarmState,
    action: Action,
    rainfall: RainfallLabel,
    cfg: &SimConfig,
    rng: &mut R,
) -> StepOutcome {
    let mut next = state.clone();
    let health_before = state.crop_health();

    next.soil_moisture += rainfall.moisture_delta();

    let mut scouted = None;
    let (feedback, log_key) = match action {
        Action::Irrigate => {
            next.soil_moisture += IRRIGATE_MOISTURE_GAIN;
            next.money -= cfg.costs.irrigation;
            let mut line = format!(
                "Irrigated the field (+{IRRIGATE_MOISTURE_GAIN:.0} moisture, -${:.2}).",
                cfg.costs.irrigation
            );
            if rainfall.is_wet() {
                next.sustainability -= IRRIGATE_WET_DAY_PENALTY;
                line.push_str(" Rain already covered today's needs;");
                line.push_str(&format!(" sustainability -{IRRIGATE_WET_DAY_PENALTY:.0}."));
                (line, LOG_IRRIGATE_WASTED)
            } else {
                (line, LOG_IRRIGATE)
            }
        }
        Action::Fertilize => {
            next.nitrogen += FERTILIZE_NITROGEN_GAIN;
            next.money -= cfg.costs.fertilize;
            let mut line = format!(
                "Applied fertilizer (+{FERTILIZE_NITROGEN_GAIN:.0} nitrogen, -${:.2}).",
                cfg.costs.fertilize
            );
            if rainfall == RainfallLabel::High {
                next.sustainability -= FERTILIZE_RUNOFF_PENALTY;
                line.push_str(" Heavy rain washed nutrients into the stream;");
                line.push_str(&format!(" sustainability -{FERTILIZE_RUNOFF_PENALTY:.0}."));
                (line, LOG_FERTILIZE_RUNOFF)
            } else {
                (line, LOG_FERTILIZE)
            }
        }
        Action::Scout => {
            let removed = rng.gen_range(SCOUT_PEST_REDUCTION_MIN..=SCOUT_PEST_REDUCTION_MAX);
            next.pest_pressure = clamp_percent(next.pest_pressure - u32_to_f64(removed));
            next.money -= cfg.costs.scout;
            scouted = Some(removed);
            (
                format!(
                    "Scouted the rows and cleared {removed} points of pest pressure (-${:.2}).",
                    cfg.costs.scout
                ),
                LOG_SCOUT,
            )
        }
        Action::Wait => (
            format!("Waited and watched the field through a {rainfall}-rain day."),
            LOG_WAIT,
        ),
    };

    let pest_growth = u32_to_f64(rng.gen_range(0..=PEST_GROWTH_RANDOM_MAX))
        + (PERCENT_MAX - health_before) / PEST_GROWTH_STRESS_DIVISOR;
    next.pest_pressure = clamp_percent(next.pest_pressure + pest_growth);

    // Soil moisture is clamped only here, after rain and action deltas.
    next.settle(cfg.price_band);

    let revenue = revenue_for(next.crop_health(), next.market_price);
    next.money += revenue;

    next.market_price += rng.gen_range(-MARKET_DRIFT..=MARKET_DRIFT);
    next.settle(cfg.price_band);

    next.actions_taken_today.push(action);

    StepOutcome {
        state: next,
        feedback,
        log_key,
        revenue,
        pest_growth,
        scouted,
    }
}

/// Result of closing out a day.
#[derive(Debug, Clone, PartialEq)]
pub enum DayAdvance {
    /// The next day's opening state.
    Next(FarmState),
    /// The final day ended; the state is terminal with `day > series_length`.
    Complete(FarmState),
}

/// Close out the current day.
///
/// Closing the last day of the series yields the terminal state, one day past
/// the series with every other field carried over.
#[must_use]
pub fn advance_day(state: &FarmState, series_length: u32, next_rain_seed: u64) -> DayAdvance {
    let mut next = state.clone();
    next.day = state.day.saturating_add(1);
    next.actions_taken_today = ActionLog::new();
    if state.day >= series_length {
        return DayAdvance::Complete(next);
    }
    next.rain_seed = next_rain_seed;
    DayAdvance::Next(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn opening(moisture: f64) -> FarmState {
        FarmState::opening(&SimConfig::default_config(), moisture)
    }

    #[test]
    fn irrigate_on_medium_rain_adds_rain_then_action() {
        let cfg = SimConfig::default_config();
        let start = opening(55.0);
        let mut rng = SmallRng::seed_from_u64(1);
        let out = apply_action(&start, Action::Irrigate, RainfallLabel::Medium, &cfg, &mut rng);
        assert!((out.state.soil_moisture - 71.0).abs() < 1e-12);
        assert!((out.state.sustainability - 98.0).abs() < 1e-12);
        let expected_money = 10.0 - cfg.costs.irrigation + out.revenue;
        assert!((out.state.money - expected_money).abs() < 1e-12);
        assert_eq!(out.log_key, LOG_IRRIGATE_WASTED);
        assert_eq!(out.state.actions_taken_today.as_slice(), &[Action::Irrigate]);
    }

    #[test]
    fn irrigate_on_dry_day_keeps_sustainability() {
        let cfg = SimConfig::default_config();
        let start = opening(55.0);
        let mut rng = SmallRng::seed_from_u64(2);
        let out = apply_action(&start, Action::Irrigate, RainfallLabel::Low, &cfg, &mut rng);
        assert!((out.state.soil_moisture - 60.0).abs() < 1e-12);
        assert!((out.state.sustainability - start.sustainability).abs() < 1e-12);
    }

    #[test]
    fn fertilize_in_heavy_rain_costs_three_sustainability() {
        let cfg = SimConfig::default_config();
        let start = opening(55.0);
        let mut rng = SmallRng::seed_from_u64(3);
        let out = apply_action(&start, Action::Fertilize, RainfallLabel::High, &cfg, &mut rng);
        assert!((start.sustainability - out.state.sustainability - 3.0).abs() < 1e-12);
        assert!((out.state.nitrogen - 52.0).abs() < 1e-12);
        assert!((out.state.soil_moisture - 67.0).abs() < 1e-12);
        assert!(out.feedback.contains("sustainability -3"));
    }

    #[test]
    fn scout_removes_between_five_and_fifteen() {
        let cfg = SimConfig::default_config();
        let mut start = opening(55.0);
        start.pest_pressure = 60.0;
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let out = apply_action(&start, Action::Scout, RainfallLabel::None, &cfg, &mut rng);
            let removed = out.scouted.unwrap();
            assert!((5..=15).contains(&removed));
            let expected = 60.0 - f64::from(removed) + out.pest_growth;
            assert!((out.state.pest_pressure - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn scouting_a_light_infestation_stops_at_zero() {
        let cfg = SimConfig::default_config();
        let mut start = opening(55.0);
        start.pest_pressure = 3.0;
        for seed in 0..200 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let out = apply_action(&start, Action::Scout, RainfallLabel::Medium, &cfg, &mut rng);
            assert!(out.scouted.unwrap() >= 5);
            assert!((out.state.pest_pressure - out.pest_growth.min(100.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn pest_growth_uses_pre_step_health() {
        let cfg = SimConfig::default_config();
        let start = opening(55.0);
        let stress = (100.0 - start.crop_health()) / 20.0;
        for seed in 0..100 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let out = apply_action(&start, Action::Wait, RainfallLabel::Low, &cfg, &mut rng);
            let random_part = out.pest_growth - stress;
            assert!(random_part > -1e-9 && random_part < 5.0 + 1e-9);
            assert!((random_part - random_part.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn health_is_recomputed_after_every_action() {
        let cfg = SimConfig::default_config();
        let mut state = opening(30.0);
        let mut rng = SmallRng::seed_from_u64(9);
        for (idx, action) in Action::ALL.iter().cycle().take(40).enumerate() {
            let rain = RainfallLabel::ALL[idx % 4];
            state = apply_action(&state, *action, rain, &cfg, &mut rng).state;
            let expected =
                crate::state::crop_health(state.soil_moisture, state.nitrogen, state.pest_pressure);
            assert!((state.crop_health() - expected).abs() < 1e-12);
            assert!(state.is_within_bounds(cfg.price_band));
        }
    }

    #[test]
    fn revenue_tiers() {
        assert!((revenue_for(71.0, 1.2) - 4.8).abs() < 1e-12);
        assert!((revenue_for(70.0, 1.0) - 2.0).abs() < 1e-12);
        assert!((revenue_for(40.5, 1.0) - 2.0).abs() < 1e-12);
        assert!(revenue_for(40.0, 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn advance_resets_actions_until_last_day() {
        let mut state = opening(50.0);
        state.actions_taken_today.push(Action::Wait);
        match advance_day(&state, 3, 77) {
            DayAdvance::Next(next) => {
                assert_eq!(next.day, 2);
                assert!(next.actions_taken_today.is_empty());
                assert_eq!(next.rain_seed, 77);
            }
            DayAdvance::Complete(_) => panic!("season ended early"),
        }
        state.day = 3;
        let DayAdvance::Complete(last) = advance_day(&state, 3, 0) else {
            panic!("last day should close the season");
        };
        assert_eq!(last.day, 4);
        assert_eq!(last.rain_seed, state.rain_seed);
        assert!((last.money - state.money).abs() < f64::EPSILON);
    }
}
