//! IPC adapter error types.

use autotheme_domain::error::{AutoThemeError, TransportError};

/// Errors raised while exchanging one command with the service.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Connecting, writing or reading failed.
    #[error("socket error")]
    Io(#[from] std::io::Error),

    /// The request could not be serialised.
    #[error("failed to encode request")]
    Encode(#[source] serde_json::Error),

    /// The service closed the connection without a status line.
    #[error("service sent an empty reply")]
    EmptyReply,
}

impl IpcError {
    /// Convert into the transport error seen by application services.
    pub fn into_transport(self) -> TransportError {
        match self {
            Self::Io(err) => TransportError::Io(err),
            Self::Encode(err) => TransportError::Garbled(err.to_string()),
            Self::EmptyReply => TransportError::Garbled("empty reply".to_string()),
        }
    }

    /// Convert into an [`AutoThemeError::Transport`].
    pub fn into_domain(self) -> AutoThemeError {
        AutoThemeError::Transport(self.into_transport())
    }
}

impl From<IpcError> for AutoThemeError {
    fn from(err: IpcError) -> Self {
        err.into_domain()
    }
}
