//! Error taxonomy shared by the preprocessor, engine and handoff layers.
use thiserror::Error;

use crate::state::Action;

/// Every failure the core can report. All of them are recoverable.
#[derive(Debug, Error)]
pub enum SimError {
    /// Network or parse failure fetching upstream weather.
    #[error("upstream weather data unavailable: {0}")]
    UpstreamDataUnavailable(String),
    /// The simulation was entered without a setup handoff record.
    #[error("no handoff state found; setup must run first")]
    MissingHandoffState,
    /// An operation was attempted after the season completed.
    #[error("cannot {attempted} after the season ended on day {day}")]
    InvalidTransition { day: u32, attempted: Transition },
    /// A configuration document failed to parse or validate.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The persisted handoff record could not be encoded or decoded.
    #[error("malformed handoff record: {0}")]
    Handoff(#[from] serde_json::Error),
    /// The handoff store could not be read or written.
    #[error("handoff storage failed to {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// The operation rejected by [`SimError::InvalidTransition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Action(Action),
    AdvanceDay,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Action(action) => write!(f, "{}", action.verb()),
            Self::AdvanceDay => write!(f, "advance the day"),
        }
    }
}

/// How a front end should react to an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Show a dismissible notice and continue with fallback data.
    Notice,
    /// Send the player back to the setup screen.
    RedirectToSetup,
    /// Drop the request silently.
    Ignore,
}

impl SimError {
    /// User-visible reaction for this error.
    #[must_use]
    pub const fn recovery(&self) -> Recovery {
        match self {
            Self::UpstreamDataUnavailable(_) | Self::Config(_) => Recovery::Notice,
            Self::MissingHandoffState | Self::Handoff(_) | Self::Storage { .. } => {
                Recovery::RedirectToSetup
            }
            Self::InvalidTransition { .. } => Recovery::Ignore,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
