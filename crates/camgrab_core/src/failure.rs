use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport-level failure reasons reported by a fetcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl FailureKind {
    /// Status code carried by the failure, if it came from an HTTP response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FailureKind::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Coarse taxonomy of everything that can go wrong during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Recorded on the outcome; the tick still completes.
    ToleratedNetwork,
    FatalConfig,
    FatalNetwork,
    FatalDecode,
    FatalPersistence,
    FatalHandler,
}

impl ErrorCategory {
    pub fn is_fatal(self) -> bool {
        !matches!(self, ErrorCategory::ToleratedNetwork)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorCategory::ToleratedNetwork => "tolerated network error",
            ErrorCategory::FatalConfig => "fatal configuration error",
            ErrorCategory::FatalNetwork => "fatal network error",
            ErrorCategory::FatalDecode => "fatal decode error",
            ErrorCategory::FatalPersistence => "fatal persistence error",
            ErrorCategory::FatalHandler => "fatal handler error",
        };
        f.write_str(label)
    }
}
