use crate::config::SimConfig;
use crate::constants::LOG_SEASON_COMPLETE;
use crate::engine::step::{self, DayAdvance};
use crate::engine::{DayOutcome, SeasonPhase, SeasonRng, StepRecord};
use crate::error::{SimError, SimResult, Transition};
use crate::handoff::HandoffState;
use crate::rainfall::RainfallLabel;
use crate::result::{ActionTally, SeasonSummary};
use crate::state::{Action, FarmState};
use crate::weather::{DailyWeather, WeatherConfig};

/// Feedback returned to the caller after an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub day: u32,
    pub action: Action,
    pub feedback: String,
    pub revenue: f64,
}

/// Caller-owned season: configuration, weather, current state and history.
///
/// The only mutation path is [`FarmSession::apply_action`] and
/// [`FarmSession::advance_day`]; each replaces the state with a new value.
#[derive(Debug, Clone)]
pub struct FarmSession {
    cfg: SimConfig,
    weather: Vec<DailyWeather>,
    state: FarmState,
    rng: SeasonRng,
    phase: SeasonPhase,
    tally: ActionTally,
    history: Vec<StepRecord>,
    summary: Option<SeasonSummary>,
}

impl FarmSession {
    /// Construct a session from derived weather days.
    ///
    /// Initial soil moisture is the first day's soil water as a share of
    /// field capacity. An empty series yields an already complete season.
    #[must_use]
    pub fn new(
        cfg: SimConfig,
        weather_cfg: &WeatherConfig,
        weather: Vec<DailyWeather>,
        seed: u64,
    ) -> Self {
        let soil_moisture = weather.first().map_or(cfg.start.soil_moisture, |first| {
            weather_cfg.water_to_percent(first.soil_water_mm)
        });
        let rng = SeasonRng::from_user_seed(seed);
        let mut state = FarmState::opening(&cfg, soil_moisture);
        state.rain_seed = rng.rain_seed(1);

        let mut session = Self {
            cfg,
            weather,
            state,
            rng,
            phase: SeasonPhase::InProgress { day: 1 },
            tally: ActionTally::default(),
            history: Vec::new(),
            summary: None,
        };
        if session.series_length() == 0 {
            session.finish();
        }
        session
    }

    /// Construct a session from the setup screen's handoff record.
    #[must_use]
    pub fn from_handoff(
        handoff: &HandoffState,
        cfg: SimConfig,
        weather_cfg: &WeatherConfig,
        seed: u64,
    ) -> Self {
        Self::new(cfg, weather_cfg, handoff.season_days().to_vec(), seed)
    }

    /// Apply an action to today's field.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidTransition`] once the season is complete;
    /// the terminal state is left untouched.
    pub fn apply_action(&mut self, action: Action) -> SimResult<ActionOutcome> {
        self.ensure_in_progress(Transition::Action(action))?;
        let rainfall = self.rainfall_today();
        let outcome =
            step::apply_action(&self.state, action, rainfall, &self.cfg, self.rng.field());

        log::debug!(
            "day {} {action} ({rainfall} rain): {} | health {:.1} money {:.2}",
            self.state.day,
            outcome.log_key,
            outcome.state.crop_health(),
            outcome.state.money
        );

        self.tally.record(action);
        self.history.push(StepRecord {
            day: self.state.day,
            action,
            rainfall,
            revenue: outcome.revenue,
            feedback: outcome.feedback.clone(),
            state: outcome.state.clone(),
        });
        self.state = outcome.state;

        Ok(ActionOutcome {
            day: self.state.day,
            action,
            feedback: outcome.feedback,
            revenue: outcome.revenue,
        })
    }

    /// Close the current day.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidTransition`] once the season is complete.
    pub fn advance_day(&mut self) -> SimResult<DayOutcome> {
        self.ensure_in_progress(Transition::AdvanceDay)?;
        let next_seed = self.rng.rain_seed(self.state.day.saturating_add(1));
        match step::advance_day(&self.state, self.series_length(), next_seed) {
            DayAdvance::Next(next) => {
                self.state = next;
                self.phase = SeasonPhase::InProgress {
                    day: self.state.day,
                };
                Ok(DayOutcome::NextDay {
                    day: self.state.day,
                    rainfall: self.rainfall_today(),
                })
            }
            DayAdvance::Complete(last) => {
                self.state = last;
                Ok(DayOutcome::SeasonComplete(self.finish()))
            }
        }
    }

    fn finish(&mut self) -> SeasonSummary {
        let summary = SeasonSummary::from_state(
            &self.state,
            self.series_length(),
            self.cfg.start.money,
            self.tally,
        );
        log::info!(
            "{LOG_SEASON_COMPLETE}: {} days, profit {:.2}, sustainability {:.0}, verdict {}",
            summary.days,
            summary.final_profit,
            summary.final_sustainability,
            summary.verdict
        );
        self.phase = SeasonPhase::Complete;
        self.summary = Some(summary.clone());
        summary
    }

    fn ensure_in_progress(&self, attempted: Transition) -> SimResult<()> {
        if self.phase.is_complete() {
            log::debug!("rejected {attempted} on completed season");
            return Err(SimError::InvalidTransition {
                day: self.state.day,
                attempted,
            });
        }
        Ok(())
    }

    /// Rainfall label for the current day.
    #[must_use]
    pub fn rainfall_today(&self) -> RainfallLabel {
        let idx = usize::try_from(self.state.day.saturating_sub(1)).unwrap_or(usize::MAX);
        self.weather
            .get(idx)
            .map_or(RainfallLabel::None, |day| day.rainfall)
    }

    /// Weather for the current day, if any.
    #[must_use]
    pub fn weather_today(&self) -> Option<&DailyWeather> {
        let idx = usize::try_from(self.state.day.saturating_sub(1)).ok()?;
        self.weather.get(idx)
    }

    #[must_use]
    pub fn series_length(&self) -> u32 {
        u32::try_from(self.weather.len()).unwrap_or(u32::MAX)
    }

    /// Borrow the current state.
    #[must_use]
    pub const fn state(&self) -> &FarmState {
        &self.state
    }

    #[must_use]
    pub const fn phase(&self) -> SeasonPhase {
        self.phase
    }

    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.cfg
    }

    #[must_use]
    pub fn weather(&self) -> &[DailyWeather] {
        &self.weather
    }

    /// Every action applied so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    #[must_use]
    pub const fn summary(&self) -> Option<&SeasonSummary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng.user_seed()
    }

    /// Draws consumed from the field stream, for replay diagnostics.
    #[must_use]
    pub fn draws(&mut self) -> u64 {
        self.rng.field().draws()
    }

    /// Deterministically reseed the random streams.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = SeasonRng::from_user_seed(seed);
        self.state.rain_seed = self.rng.rain_seed(self.state.day);
    }

    /// Consume the session, returning the underlying state.
    #[must_use]
    pub fn into_state(self) -> FarmState {
        self.state
    }
}
