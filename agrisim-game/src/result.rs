//! End-of-season summary and scoring.
use serde::{Deserialize, Serialize};

use crate::constants::{SCORE_PROFIT_WEIGHT, VERDICT_SUSTAINABLE_MIN};
use crate::crop::CropKind;
use crate::numbers::round_f64_to_i32;
use crate::state::{Action, FarmState};

/// Overall judgement of a finished season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Made money and kept the land healthy.
    Thriving,
    /// Kept the land healthy without turning a profit.
    Sustainable,
    /// Turned a profit at the land's expense.
    Profitable,
    Struggling,
}

impl Verdict {
    #[must_use]
    pub fn judge(final_money: f64, starting_money: f64, sustainability: f64) -> Self {
        let profitable = final_money > starting_money;
        let sustainable = sustainability >= VERDICT_SUSTAINABLE_MIN;
        match (profitable, sustainable) {
            (true, true) => Self::Thriving,
            (false, true) => Self::Sustainable,
            (true, false) => Self::Profitable,
            (false, false) => Self::Struggling,
        }
    }

    #[must_use]
    pub const fn headline(self) -> &'static str {
        match self {
            Self::Thriving => "A thriving harvest on healthy land.",
            Self::Sustainable => "The soil is in good shape, even if the books are thin.",
            Self::Profitable => "A profitable season that borrowed against the land.",
            Self::Struggling => "A hard season. Next year can only be better.",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Thriving => write!(f, "thriving"),
            Self::Sustainable => write!(f, "sustainable"),
            Self::Profitable => write!(f, "profitable"),
            Self::Struggling => write!(f, "struggling"),
        }
    }
}

/// Count of each action taken over the season.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTally {
    pub irrigate: u32,
    pub fertilize: u32,
    pub scout: u32,
    pub wait: u32,
}

impl ActionTally {
    pub fn record(&mut self, action: Action) {
        let slot = match action {
            Action::Irrigate => &mut self.irrigate,
            Action::Fertilize => &mut self.fertilize,
            Action::Scout => &mut self.scout,
            Action::Wait => &mut self.wait,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.irrigate
            .saturating_add(self.fertilize)
            .saturating_add(self.scout)
            .saturating_add(self.wait)
    }
}

/// Terminal summary produced when the last day is advanced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub days: u32,
    pub final_profit: f64,
    pub final_sustainability: f64,
    pub final_crop_health: f64,
    pub actions: ActionTally,
    pub verdict: Verdict,
    pub score: i32,
}

impl SeasonSummary {
    #[must_use]
    pub fn from_state(
        state: &FarmState,
        days: u32,
        starting_money: f64,
        actions: ActionTally,
    ) -> Self {
        let verdict = Verdict::judge(state.money, starting_money, state.sustainability);
        let raw_score =
            state.money * SCORE_PROFIT_WEIGHT + state.sustainability + state.crop_health();
        Self {
            days,
            final_profit: state.money,
            final_sustainability: state.sustainability,
            final_crop_health: state.crop_health(),
            actions,
            verdict,
            score: round_f64_to_i32(raw_score).max(0),
        }
    }

    /// One-line text for the result screen, naming the crop and replay seed.
    #[must_use]
    pub fn result_line(&self, crop: CropKind, seed: u64) -> String {
        format!(
            "{crop} seed {seed}: {} after {} days | profit ${:.2} | sustainability {:.0} \
             | score {} | {}",
            self.verdict,
            self.days,
            self.final_profit,
            self.final_sustainability,
            self.score,
            self.verdict.headline()
        )
    }
}
