//! Agrisim Game Engine
//!
//! Platform-agnostic core of the Agrisim farming game: weather preprocessing
//! (rainfall labels, Hargreaves ETo, soil water balance) and the daily
//! simulation engine. This crate has no UI or platform-specific dependencies;
//! asynchronous fetching is available behind the `async` feature.

pub mod config;
pub mod constants;
pub mod crop;
pub mod engine;
pub mod error;
pub mod evapotranspiration;
pub mod fetch;
pub mod handoff;
pub mod numbers;
pub mod rainfall;
pub mod result;
pub mod state;
pub mod upstream;
pub mod weather;

// Re-export commonly used types
pub use config::{ActionCosts, PriceBand, SimConfig, StartingValues};
pub use crop::CropKind;
pub use engine::session::ActionOutcome;
pub use engine::{
    CountingRng, DayAdvance, DayOutcome, FarmSession, SeasonPhase, SeasonRng, StepOutcome,
    StepRecord, advance_day, apply_action, derive_stream_seed, revenue_for,
};
pub use error::{Recovery, SimError, SimResult, Transition};
pub use evapotranspiration::{daily_et0, extraterrestrial_radiation, hargreaves_et0};
pub use fetch::{RequestGate, RequestToken};
#[cfg(feature = "async")]
pub use fetch::{SupersedingFetcher, WeatherSource};
pub use handoff::{
    GeoPoint, HandoffState, HandoffStore, MemoryHandoffStore, ReverseGeocoder,
    resolve_location_name,
};
pub use rainfall::{RainfallLabel, ThresholdTable, classify_rainfall};
pub use result::{ActionTally, SeasonSummary, Verdict};
pub use state::{Action, ActionLog, FarmState, StateDisplay, crop_health};
pub use upstream::{
    UpstreamRequest, fallback_series, parse_upstream_response, series_or_fallback,
};
pub use weather::{DailyWeather, RawDay, WeatherConfig, WeatherOutlook, preprocess};

/// What the setup screen collected before a season starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonSetup {
    pub crop: CropKind,
    pub simulation_days: u32,
    pub location: GeoPoint,
    pub raw_series: Vec<RawDay>,
}

/// Main season engine tying setup, handoff storage and sessions together
pub struct SeasonEngine<S>
where
    S: HandoffStore,
{
    store: S,
    sim_cfg: SimConfig,
    weather_cfg: WeatherConfig,
}

impl<S> SeasonEngine<S>
where
    S: HandoffStore,
{
    /// Create an engine over `store` using the embedded default configs
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_configs(store, SimConfig::default_config(), WeatherConfig::default_config())
    }

    #[must_use]
    pub const fn with_configs(store: S, sim_cfg: SimConfig, weather_cfg: WeatherConfig) -> Self {
        Self {
            store,
            sim_cfg,
            weather_cfg,
        }
    }

    /// Preprocess the setup's weather and persist the handoff record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    pub fn prepare_season<G>(&self, setup: SeasonSetup, geocoder: &G) -> SimResult<HandoffState>
    where
        G: ReverseGeocoder + ?Sized,
    {
        let outlook = preprocess(
            &setup.raw_series,
            setup.location.lat,
            setup.crop,
            &self.weather_cfg,
        );
        let location_name = resolve_location_name(geocoder, setup.location);
        log::info!(
            "prepared {} season at {location_name}: {} of {} days available",
            setup.crop,
            outlook.len(),
            setup.simulation_days
        );
        let handoff = HandoffState::new(
            outlook,
            setup.simulation_days,
            setup.location,
            location_name,
        );
        self.store.save_handoff(&handoff)?;
        Ok(handoff)
    }

    /// Enter the simulation from the stored handoff record.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MissingHandoffState`] when setup never ran, or a
    /// decode error for a malformed record.
    pub fn start_session(&self, seed: u64) -> SimResult<FarmSession> {
        let handoff = self.store.require_handoff()?;
        Ok(FarmSession::from_handoff(
            &handoff,
            self.sim_cfg.clone(),
            &self.weather_cfg,
            seed,
        ))
    }

    /// Load the stored handoff record, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the stored record cannot be decoded.
    pub fn load_handoff(&self) -> SimResult<Option<HandoffState>> {
        self.store.load_handoff()
    }

    /// Drop the stored handoff record so the next entry goes through setup
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed.
    pub fn clear_handoff(&self) -> SimResult<()> {
        self.store.clear_handoff()
    }

    #[must_use]
    pub const fn sim_config(&self) -> &SimConfig {
        &self.sim_cfg
    }

    #[must_use]
    pub const fn weather_config(&self) -> &WeatherConfig {
        &self.weather_cfg
    }
}
