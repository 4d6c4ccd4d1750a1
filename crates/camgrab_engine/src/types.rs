use std::path::PathBuf;

use camgrab_core::{FailureKind, Stage};
use chrono::{DateTime, Local};
use image::{DynamicImage, GenericImageView};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub status: u16,
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

impl FetchOutput {
    /// Response for `url` that was not redirected.
    pub fn direct(url: &str, status: u16, bytes: Vec<u8>, content_type: Option<&str>) -> Self {
        let byte_len = bytes.len() as u64;
        Self {
            status,
            bytes,
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: url.to_string(),
                redirect_count: 0,
                content_type: content_type.map(str::to_string),
                byte_len,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        self.kind.status_code()
    }
}

/// Everything learned during one tick.
///
/// `image` is only set when the fetch and decode both succeeded. Handlers may
/// rewrite any field; later handlers see those changes.
#[derive(Debug, Clone)]
pub struct OutcomeRecord {
    pub tick: u64,
    pub source_url: String,
    pub timestamp: DateTime<Local>,
    pub raw_status: Option<u16>,
    pub final_url: Option<String>,
    pub content_type: Option<String>,
    pub image: Option<DynamicImage>,
    /// Tolerated network failure, if any.
    pub error: Option<FetchError>,
    pub save_directory: Option<PathBuf>,
    pub save_path: Option<PathBuf>,
    pub is_saved: bool,
    pub stage: Stage,
}

impl OutcomeRecord {
    pub fn new(
        tick: u64,
        source_url: impl Into<String>,
        timestamp: DateTime<Local>,
        save_directory: Option<PathBuf>,
    ) -> Self {
        Self {
            tick,
            source_url: source_url.into(),
            timestamp,
            raw_status: None,
            final_url: None,
            content_type: None,
            image: None,
            error: None,
            save_directory,
            save_path: None,
            is_saved: false,
            stage: Stage::Start,
        }
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|image| image.dimensions())
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn summary(&self) -> OutcomeSummary {
        let (width, height) = match self.dimensions() {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };
        OutcomeSummary {
            tick: self.tick,
            url: self.source_url.clone(),
            timestamp: self.timestamp.to_rfc3339(),
            status: self.raw_status,
            width,
            height,
            error: self.error.as_ref().map(|err| err.to_string()),
            save_path: self
                .save_path
                .as_ref()
                .map(|path| path.display().to_string()),
            saved: self.is_saved,
        }
    }
}

/// Flat, serializable view of an [`OutcomeRecord`] for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeSummary {
    pub tick: u64,
    pub url: String,
    pub timestamp: String,
    pub status: Option<u16>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub error: Option<String>,
    pub save_path: Option<String>,
    pub saved: bool,
}
