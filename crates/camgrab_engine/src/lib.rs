//! Camgrab engine: fetch, decode, persist and dispatch one webcam snapshot per tick.
mod codec;
mod engine;
mod error;
mod fetch;
mod handler;
mod persist;
mod types;

pub use codec::{CodecError, ImageCodec, JpegCodec};
pub use engine::{Clock, Grabber, GrabberBuilder};
pub use error::GrabError;
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use handler::{handler_fn, FnHandler, Handler, LogHandler, SaveHandler};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use types::{FetchError, FetchMetadata, FetchOutput, OutcomeRecord, OutcomeSummary};

pub use camgrab_core::{
    Classification, ErrorCategory, FailureKind, GrabSettings, IgnorePolicy, SaveTemplate,
    SettingsError, Stage, DEFAULT_IGNORED_STATUS_CODES,
};
pub use image::DynamicImage;
pub use tokio_util::sync::CancellationToken;
