//! Service protocol vocabulary: commands sent to the background service and
//! the status replies it answers with.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Reply timeout for [`Command::Switch`].
pub const SWITCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Reply timeout for every other command.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// A request understood by the background service. Commands carry no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Re-evaluate the schedule and switch the theme now.
    Switch,
    /// Check whether the service may read the device location.
    LocationAccess,
    /// Register the service to start with the user session.
    AddAutostart,
    /// Remove the autostart registration.
    RemoveAutostart,
}

impl Command {
    /// Default time to wait for the reply to this command.
    #[must_use]
    pub fn default_timeout(self) -> Duration {
        match self {
            Self::Switch => SWITCH_TIMEOUT,
            Self::LocationAccess | Self::AddAutostart | Self::RemoveAutostart => COMMAND_TIMEOUT,
        }
    }

    /// Token used on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Switch => "Switch",
            Self::LocationAccess => "LocationAccess",
            Self::AddAutostart => "AddAutostart",
            Self::RemoveAutostart => "RemoveAutostart",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The service's answer to exactly one [`Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReply {
    Ok,
    NoLocationAccess,
    /// Any other token, kept verbatim for diagnostics.
    Error(String),
}

impl StatusReply {
    const OK: &'static str = "Ok";
    const NO_LOCATION_ACCESS: &'static str = "NoLocAccess";

    /// Interpret a raw status token. Never fails: unknown tokens become
    /// [`StatusReply::Error`].
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match token.trim() {
            Self::OK => Self::Ok,
            Self::NO_LOCATION_ACCESS => Self::NoLocationAccess,
            other => Self::Error(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// The raw status token.
    #[must_use]
    pub fn as_token(&self) -> &str {
        match self {
            Self::Ok => Self::OK,
            Self::NoLocationAccess => Self::NO_LOCATION_ACCESS,
            Self::Error(detail) => detail,
        }
    }
}

impl fmt::Display for StatusReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}
