//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`AutoThemeError`] via `#[from]` (or `into_domain` in adapter crates).

use std::time::Duration;

use crate::command::Command;
use crate::settings::SwitchMode;

/// Workspace-wide error returned by application services.
#[derive(Debug, thiserror::Error)]
pub enum AutoThemeError {
    /// User input was rejected before any command was sent.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// No usable reply arrived from the background service.
    #[error("service unreachable: {0}")]
    Transport(#[from] TransportError),

    /// The OS or the service refused access to the device location.
    #[error("location access denied")]
    PermissionDenied,

    /// Location data never showed up within the poll budget.
    #[error("location data not available after {attempts} attempts")]
    LocationTimeout { attempts: u32 },

    /// The service answered a non-switch command with a non-`Ok` status.
    #[error("service rejected command {command}: {status}")]
    CommandRejected { command: Command, status: String },

    /// The service answered `Switch` with a non-`Ok` status.
    #[error("theme switch failed: {status}")]
    SwitchRejected { status: String },

    /// Another apply is still waiting for its `Switch` reply.
    #[error("a theme switch is already in flight")]
    ApplyInProgress,

    /// Apply was requested while automatic switching is off.
    #[error("automatic theme switching is disabled")]
    SwitchingDisabled,

    /// Device-location mode has no resolved position yet.
    #[error("device location has not been resolved")]
    LocationUnresolved,

    /// The operation was superseded by a newer user action.
    #[error("operation cancelled")]
    Cancelled,

    /// Persisting or loading configuration failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Rejected user input or broken configuration invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("offset must be a whole number of minutes, got {0:?}")]
    InvalidOffset(String),

    #[error("time of day must be HH:MM, got {0:?}")]
    InvalidTimeOfDay(String),

    #[error("latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),

    #[error("mode {0} requires automatic switching to be enabled")]
    SwitchingNotEnabled(SwitchMode),

    #[error("mode {0} requires location to be enabled")]
    LocationNotEnabled(SwitchMode),
}

/// Failure to obtain a reply from the background service.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("no reply to {command} within {timeout:?}")]
    Timeout { command: Command, timeout: Duration },

    #[error("connection to service failed")]
    Io(#[from] std::io::Error),

    #[error("garbled reply {0:?}")]
    Garbled(String),
}
