//! The record the setup screen hands to the simulation screen, and where it is kept.
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::crop::CropKind;
use crate::error::{SimError, SimResult};
use crate::weather::{DailyWeather, WeatherOutlook};

/// Storage key used by the setup and simulation screens.
pub const HANDOFF_KEY: &str = "agrisim.handoff";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Generic label used when reverse geocoding is unavailable.
    #[must_use]
    pub fn fallback_label(self) -> String {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lon >= 0.0 { 'E' } else { 'W' };
        format!(
            "Field near {:.2}°{ns}, {:.2}°{ew}",
            self.lat.abs(),
            self.lon.abs()
        )
    }
}

/// Setup output consumed once by the simulation screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandoffState {
    pub crop_kind: CropKind,
    pub simulation_days: u32,
    pub location: GeoPoint,
    pub location_name: String,
    pub weather_series: Vec<DailyWeather>,
}

impl HandoffState {
    #[must_use]
    pub fn new(
        outlook: WeatherOutlook,
        simulation_days: u32,
        location: GeoPoint,
        location_name: String,
    ) -> Self {
        Self {
            crop_kind: outlook.crop,
            simulation_days,
            location,
            location_name,
            weather_series: outlook.days,
        }
    }

    /// Weather for the playable season: the first `simulation_days` entries.
    #[must_use]
    pub fn season_days(&self) -> &[DailyWeather] {
        let wanted = usize::try_from(self.simulation_days).unwrap_or(usize::MAX);
        &self.weather_series[..wanted.min(self.weather_series.len())]
    }

    /// Encode for key-value storage.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Handoff`] if serialization fails.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from key-value storage.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Handoff`] for a malformed record.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Trait for abstracting handoff persistence.
/// Platform-specific implementations should provide this
pub trait HandoffStore {
    /// Persist the record, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save_handoff(&self, handoff: &HandoffState) -> SimResult<()>;

    /// Read the record if one was written.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored record cannot be decoded.
    fn load_handoff(&self) -> SimResult<Option<HandoffState>>;

    /// Remove the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed.
    fn clear_handoff(&self) -> SimResult<()>;

    /// Read the record, treating absence as [`SimError::MissingHandoffState`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MissingHandoffState`] when setup never ran.
    fn require_handoff(&self) -> SimResult<HandoffState> {
        self.load_handoff()?.ok_or(SimError::MissingHandoffState)
    }
}

/// In-memory key-value store, shaped like browser session storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryHandoffStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryHandoffStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HandoffStore for MemoryHandoffStore {
    fn save_handoff(&self, handoff: &HandoffState) -> SimResult<()> {
        let encoded = handoff.to_json()?;
        self.entries
            .borrow_mut()
            .insert(HANDOFF_KEY.to_string(), encoded);
        Ok(())
    }

    fn load_handoff(&self) -> SimResult<Option<HandoffState>> {
        self.entries
            .borrow()
            .get(HANDOFF_KEY)
            .map(|raw| HandoffState::from_json(raw))
            .transpose()
    }

    fn clear_handoff(&self) -> SimResult<()> {
        self.entries.borrow_mut().remove(HANDOFF_KEY);
        Ok(())
    }
}

/// Reverse-geocoding collaborator seam.
pub trait ReverseGeocoder {
    /// Display name for a point.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    fn display_name(&self, point: GeoPoint) -> SimResult<String>;
}

/// Resolve a display name, never blocking setup on geocoder failure.
pub fn resolve_location_name<G: ReverseGeocoder + ?Sized>(geocoder: &G, point: GeoPoint) -> String {
    match geocoder.display_name(point) {
        Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
        Ok(_) => point.fallback_label(),
        Err(err) => {
            log::warn!("reverse geocoding failed, using coordinates: {err}");
            point.fallback_label()
        }
    }
}
