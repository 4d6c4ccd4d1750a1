//! Camgrab core: pure types and policies for the grab cycle, free of I/O.
mod failure;
mod naming;
mod policy;
mod settings;
mod stage;

pub use failure::{ErrorCategory, FailureKind};
pub use naming::{render_save_path, short_hash, SaveTemplate, DEFAULT_SAVE_TEMPLATE};
pub use policy::{Classification, IgnorePolicy, DEFAULT_IGNORED_STATUS_CODES};
pub use settings::{GrabSettings, SettingsError, DEFAULT_SAVE_DIR};
pub use stage::Stage;
