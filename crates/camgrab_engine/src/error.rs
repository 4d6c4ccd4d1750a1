use camgrab_core::{ErrorCategory, SettingsError};
use thiserror::Error;

use crate::codec::CodecError;
use crate::persist::PersistError;
use crate::FetchError;

/// Failure that aborts a tick (and the `run` loop around it).
#[derive(Debug, Error)]
pub enum GrabError {
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("network failure: {0}")]
    Network(#[from] FetchError),
    #[error("decode failure: {0}")]
    Decode(#[source] CodecError),
    #[error("encode failure: {0}")]
    Encode(#[source] CodecError),
    #[error("persist failure: {0}")]
    Persist(#[from] PersistError),
    #[error("handler {handler} failed: {source}")]
    Handler {
        handler: String,
        #[source]
        source: anyhow::Error,
    },
}

impl GrabError {
    /// Wrap an arbitrary failure raised by a result handler.
    pub fn handler(handler: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        GrabError::Handler {
            handler: handler.into(),
            source: source.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GrabError::Settings(_) => ErrorCategory::FatalConfig,
            GrabError::Network(_) => ErrorCategory::FatalNetwork,
            GrabError::Decode(_) => ErrorCategory::FatalDecode,
            GrabError::Encode(_) | GrabError::Persist(_) => ErrorCategory::FatalPersistence,
            GrabError::Handler { .. } => ErrorCategory::FatalHandler,
        }
    }
}
