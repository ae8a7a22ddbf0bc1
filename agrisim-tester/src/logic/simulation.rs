use std::hash::Hasher;

use agrisim_game::{
    CropKind, DayOutcome, FarmSession, HandoffState, SeasonSummary, SimConfig, SimError,
    WeatherConfig, crop_health,
};
use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;

use crate::logic::policy::SeasonStrategy;

/// Maximum actions a policy may take in one day before the run is flagged.
const MAX_ACTIONS_PER_DAY: usize = 8;

/// Configuration for one automated season.
#[derive(Debug, Clone)]
pub struct SeasonPlan {
    pub strategy: SeasonStrategy,
    pub seed: u64,
    /// Replay the season a second time and compare digests.
    pub check_replay: bool,
}

/// What happened in one automated season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub strategy: SeasonStrategy,
    pub crop: CropKind,
    pub seed: u64,
    pub days: u32,
    pub actions_applied: usize,
    pub summary: SeasonSummary,
    /// Stable hash of the step history.
    pub digest: u64,
    pub violations: Vec<String>,
}

impl SeasonRecord {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Run a single season and check the engine's guarantees along the way.
#[must_use]
pub fn run_season(
    handoff: &HandoffState,
    sim_cfg: &SimConfig,
    weather_cfg: &WeatherConfig,
    plan: &SeasonPlan,
) -> SeasonRecord {
    let mut record = play(handoff, sim_cfg, weather_cfg, plan);
    if plan.check_replay {
        let replay = play(handoff, sim_cfg, weather_cfg, plan);
        if replay.digest != record.digest {
            record.violations.push(format!(
                "replay diverged: digest {:016x} vs {:016x}",
                record.digest, replay.digest
            ));
        }
    }
    record
}

fn play(
    handoff: &HandoffState,
    sim_cfg: &SimConfig,
    weather_cfg: &WeatherConfig,
    plan: &SeasonPlan,
) -> SeasonRecord {
    let seed = plan.seed;
    let mut session = FarmSession::from_handoff(handoff, sim_cfg.clone(), weather_cfg, seed);
    let mut policy = plan.strategy.create_policy(seed);
    let band = sim_cfg.price_band;
    let mut violations = Vec::new();
    let expected_days = session.series_length();
    let mut advances = 0_u32;

    let check = |session: &FarmSession, context: &str, violations: &mut Vec<String>| {
        let state = session.state();
        if !state.is_within_bounds(band) {
            violations.push(format!("{context}: state out of bounds {state:?}"));
        }
        let expected = crop_health(state.soil_moisture, state.nitrogen, state.pest_pressure);
        if (state.crop_health() - expected).abs() > 1e-9 {
            violations.push(format!(
                "{context}: crop health {:.4} does not match inputs ({expected:.4})",
                state.crop_health()
            ));
        }
    };

    check(&session, "opening", &mut violations);

    let summary = loop {
        if let Some(summary) = session.summary() {
            break summary.clone();
        }
        let day = session.state().day;
        let actions = policy.plan_day(session.state(), session.rainfall_today(), sim_cfg);
        if actions.len() > MAX_ACTIONS_PER_DAY {
            violations.push(format!(
                "day {day}: {} planned {} actions",
                policy.name(),
                actions.len()
            ));
        }
        for action in actions.into_iter().take(MAX_ACTIONS_PER_DAY) {
            if let Err(err) = session.apply_action(action) {
                violations.push(format!("day {day}: {action} rejected mid-season: {err}"));
            }
            check(&session, &format!("day {day} after {action}"), &mut violations);
        }

        advances += 1;
        match session.advance_day() {
            Ok(DayOutcome::NextDay { day: next, .. }) => {
                if next != day + 1 {
                    violations.push(format!("day counter jumped from {day} to {next}"));
                }
                if !session.state().actions_taken_today.is_empty() {
                    violations.push(format!("day {next}: action log not reset"));
                }
                check(&session, &format!("start of day {next}"), &mut violations);
            }
            Ok(DayOutcome::SeasonComplete(summary)) => break summary,
            Err(err) => {
                violations.push(format!("advance failed on day {day}: {err}"));
                break SeasonSummary::from_state(
                    session.state(),
                    expected_days,
                    sim_cfg.start.money,
                    Default::default(),
                );
            }
        }
    };

    if advances != expected_days {
        violations.push(format!(
            "season closed after {advances} advances, expected {expected_days}"
        ));
    }
    if session.state().day <= expected_days {
        violations.push(format!(
            "terminal state still on day {} of {expected_days}",
            session.state().day
        ));
    }
    if !matches!(
        session.advance_day(),
        Err(SimError::InvalidTransition { .. })
    ) {
        violations.push("advance accepted after season completion".to_string());
    }

    SeasonRecord {
        strategy: plan.strategy,
        crop: handoff.crop_kind,
        seed,
        days: expected_days,
        actions_applied: session.history().len(),
        digest: history_digest(&session),
        summary,
        violations,
    }
}

fn history_digest(session: &FarmSession) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    for record in session.history() {
        // Serializing plain data with string keys cannot fail.
        if let Ok(bytes) = serde_json::to_vec(&record.state) {
            hasher.write(&bytes);
        }
        hasher.write(record.feedback.as_bytes());
    }
    if let Ok(bytes) = serde_json::to_vec(session.state()) {
        hasher.write(&bytes);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrisim_game::{CropKind, GeoPoint, RawDay, fallback_series, preprocess};
    use chrono::NaiveDate;

    fn handoff(days: u32) -> HandoffState {
        let point = GeoPoint::new(14.6, -17.4);
        let start = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        let raw: Vec<RawDay> = fallback_series(point, start, days);
        let cfg = WeatherConfig::default_config();
        let outlook = preprocess(&raw, point.lat, CropKind::Rice, &cfg);
        HandoffState::new(outlook, days, point, point.fallback_label())
    }

    fn plan(strategy: SeasonStrategy, seed: u64) -> SeasonPlan {
        SeasonPlan {
            strategy,
            seed,
            check_replay: true,
        }
    }

    #[test]
    fn every_strategy_completes_cleanly() {
        let handoff = handoff(21);
        let sim_cfg = SimConfig::default_config();
        let weather_cfg = WeatherConfig::default_config();
        for strategy in SeasonStrategy::ALL {
            for seed in [1_u64, 77, 4096] {
                let record = run_season(&handoff, &sim_cfg, &weather_cfg, &plan(strategy, seed));
                assert!(record.passed(), "{strategy} seed {seed}: {:?}", record.violations);
                assert_eq!(record.days, 21);
                assert_eq!(record.summary.days, 21);
                assert_eq!(record.crop, CropKind::Rice);
                assert_eq!(record.seed, seed);
            }
        }
    }

    #[test]
    fn idle_strategy_never_spends_money() {
        let handoff = handoff(10);
        let record = run_season(
            &handoff,
            &SimConfig::default_config(),
            &WeatherConfig::default_config(),
            &plan(SeasonStrategy::Idle, 5),
        );
        assert_eq!(record.summary.actions.wait, 10);
        assert_eq!(record.actions_applied, 10);
        assert!(record.summary.final_profit >= 0.0);
    }

    #[test]
    fn digest_depends_on_seed() {
        let handoff = handoff(12);
        let sim_cfg = SimConfig::default_config();
        let weather_cfg = WeatherConfig::default_config();
        let a = run_season(&handoff, &sim_cfg, &weather_cfg, &plan(SeasonStrategy::Random, 1));
        let b = run_season(&handoff, &sim_cfg, &weather_cfg, &plan(SeasonStrategy::Random, 2));
        assert_ne!(a.digest, b.digest);
    }
}
