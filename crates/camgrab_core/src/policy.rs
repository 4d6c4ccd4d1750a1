use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::FailureKind;

/// Status codes a flaky webcam commonly answers with while it is rebooting,
/// overloaded or behind a misbehaving proxy.
pub const DEFAULT_IGNORED_STATUS_CODES: [u16; 14] = [
    307, 400, 408, 409, 429, 444, 451, 499, 500, 502, 503, 504, 507, 599,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Tolerated,
    Fatal,
}

/// Decides which network failures a tick absorbs and which abort it.
///
/// Anything not explicitly listed is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnorePolicy {
    pub ignored_status_codes: BTreeSet<u16>,
    pub ignore_timeout: bool,
}

impl Default for IgnorePolicy {
    fn default() -> Self {
        Self {
            ignored_status_codes: DEFAULT_IGNORED_STATUS_CODES.into_iter().collect(),
            ignore_timeout: true,
        }
    }
}

impl IgnorePolicy {
    /// Policy that tolerates nothing.
    pub fn strict() -> Self {
        Self {
            ignored_status_codes: BTreeSet::new(),
            ignore_timeout: false,
        }
    }

    /// Per-code toggle, the equivalent of an `ignore_<code>` flag.
    pub fn set_ignore(&mut self, code: u16, ignore: bool) -> &mut Self {
        if ignore {
            self.ignored_status_codes.insert(code);
        } else {
            self.ignored_status_codes.remove(&code);
        }
        self
    }

    pub fn set_ignore_timeout(&mut self, ignore: bool) -> &mut Self {
        self.ignore_timeout = ignore;
        self
    }

    pub fn is_ignored(&self, code: u16) -> bool {
        self.ignored_status_codes.contains(&code)
    }

    pub fn classify(&self, kind: &FailureKind) -> Classification {
        let tolerated = match kind {
            FailureKind::HttpStatus(code) => self.is_ignored(*code),
            FailureKind::Timeout => self.ignore_timeout,
            _ => false,
        };
        if tolerated {
            Classification::Tolerated
        } else {
            Classification::Fatal
        }
    }
}
