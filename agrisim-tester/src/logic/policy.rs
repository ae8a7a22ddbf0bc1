use std::fmt;

use agrisim_game::{Action, FarmState, RainfallLabel, SimConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Soil moisture below which the steward irrigates on dry days.
const STEWARD_DRY_SOIL: f64 = 45.0;
/// Nitrogen below which the steward fertilizes outside heavy rain.
const STEWARD_LOW_NITROGEN: f64 = 35.0;
/// Pest pressure above which the steward scouts.
const STEWARD_PEST_ALERT: f64 = 25.0;
/// Most actions the random player takes in a day.
const RANDOM_MAX_ACTIONS: usize = 3;

/// Policy interface for automated play strategies.
pub trait FieldPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Actions to take today, in order. An empty plan just ends the day.
    fn plan_day(
        &mut self,
        state: &FarmState,
        rainfall: RainfallLabel,
        cfg: &SimConfig,
    ) -> Vec<Action>;
}

/// Built-in season strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonStrategy {
    Idle,
    Irrigator,
    Steward,
    Random,
}

impl SeasonStrategy {
    pub const ALL: [Self; 4] = [Self::Idle, Self::Irrigator, Self::Steward, Self::Random];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Irrigator => "irrigator",
            Self::Steward => "steward",
            Self::Random => "random",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Irrigator => "Irrigator",
            Self::Steward => "Steward",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Idle => "waits every day",
            Self::Irrigator => "irrigates every day regardless of rain",
            Self::Steward => "irrigates, fertilizes and scouts only when the field needs it",
            Self::Random => "takes up to three random actions per day",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(value.trim()))
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn FieldPolicy + Send> {
        match self {
            Self::Idle => Box::new(IdlePolicy),
            Self::Irrigator => Box::new(IrrigatorPolicy),
            Self::Steward => Box::new(StewardPolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for SeasonStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct IdlePolicy;
struct IrrigatorPolicy;
struct StewardPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl FieldPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn plan_day(
        &mut self,
        _state: &FarmState,
        _rainfall: RainfallLabel,
        _cfg: &SimConfig,
    ) -> Vec<Action> {
        vec![Action::Wait]
    }
}

impl FieldPolicy for IrrigatorPolicy {
    fn name(&self) -> &'static str {
        "Irrigator"
    }

    fn plan_day(
        &mut self,
        _state: &FarmState,
        _rainfall: RainfallLabel,
        _cfg: &SimConfig,
    ) -> Vec<Action> {
        vec![Action::Irrigate]
    }
}

impl FieldPolicy for StewardPolicy {
    fn name(&self) -> &'static str {
        "Steward"
    }

    fn plan_day(
        &mut self,
        state: &FarmState,
        rainfall: RainfallLabel,
        cfg: &SimConfig,
    ) -> Vec<Action> {
        let mut budget = state.money;
        let mut plan = Vec::new();
        let mut take = |action: Action, cost: f64, plan: &mut Vec<Action>| {
            if budget >= cost {
                budget -= cost;
                plan.push(action);
            }
        };

        if state.soil_moisture < STEWARD_DRY_SOIL && !rainfall.is_wet() {
            take(Action::Irrigate, cfg.costs.irrigation, &mut plan);
        }
        if state.nitrogen < STEWARD_LOW_NITROGEN && rainfall != RainfallLabel::High {
            take(Action::Fertilize, cfg.costs.fertilize, &mut plan);
        }
        if state.pest_pressure > STEWARD_PEST_ALERT {
            take(Action::Scout, cfg.costs.scout, &mut plan);
        }
        if plan.is_empty() {
            plan.push(Action::Wait);
        }
        plan
    }
}

impl FieldPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn plan_day(
        &mut self,
        _state: &FarmState,
        _rainfall: RainfallLabel,
        _cfg: &SimConfig,
    ) -> Vec<Action> {
        let count = self.rng.gen_range(0..=RANDOM_MAX_ACTIONS);
        (0..count)
            .map(|_| Action::ALL[self.rng.gen_range(0..Action::ALL.len())])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opening(soil_moisture: f64) -> FarmState {
        FarmState::opening(&SimConfig::default_config(), soil_moisture)
    }

    #[test]
    fn parses_strategy_keys() {
        assert_eq!(SeasonStrategy::parse("Steward"), Some(SeasonStrategy::Steward));
        assert_eq!(SeasonStrategy::parse(" idle "), Some(SeasonStrategy::Idle));
        assert_eq!(SeasonStrategy::parse("greedy"), None);
    }

    #[test]
    fn steward_skips_irrigation_on_wet_days() {
        let cfg = SimConfig::default_config();
        let mut policy = SeasonStrategy::Steward.create_policy(1);
        let dry = opening(30.0);
        assert!(policy.plan_day(&dry, RainfallLabel::None, &cfg).contains(&Action::Irrigate));
        assert!(!policy.plan_day(&dry, RainfallLabel::Medium, &cfg).contains(&Action::Irrigate));
        assert_eq!(policy.plan_day(&opening(70.0), RainfallLabel::High, &cfg), vec![Action::Wait]);
    }

    #[test]
    fn steward_respects_budget() {
        let cfg = SimConfig::default_config();
        let mut policy = SeasonStrategy::Steward.create_policy(1);
        let mut broke = opening(30.0);
        broke.money = 0.5;
        broke.nitrogen = 10.0;
        broke.pest_pressure = 80.0;
        assert_eq!(policy.plan_day(&broke, RainfallLabel::None, &cfg), vec![Action::Wait]);
    }

    #[test]
    fn random_policy_is_seed_stable() {
        let cfg = SimConfig::default_config();
        let state = opening(50.0);
        let mut a = SeasonStrategy::Random.create_policy(9);
        let mut b = SeasonStrategy::Random.create_policy(9);
        for _ in 0..20 {
            let plan = a.plan_day(&state, RainfallLabel::Low, &cfg);
            assert!(plan.len() <= RANDOM_MAX_ACTIONS);
            assert_eq!(plan, b.plan_day(&state, RainfallLabel::Low, &cfg));
        }
    }
}
