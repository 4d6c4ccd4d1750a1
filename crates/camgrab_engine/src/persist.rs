use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

const MAX_SUFFIX: u32 = 10_000;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("no free file name for {0:?}")]
    NoFreeName(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the directory exists; create it and any parents if missing.
///
/// Calling this on an existing directory is not an error.
pub fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Writes files below `root` through a temp file and rename, never replacing
/// an existing file.
pub struct AtomicFileWriter {
    root: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` to `{root}/{relative}.{extension}`.
    ///
    /// If that file exists, `-1`, `-2`, ... is appended to the stem until a
    /// free name is found. Returns the path actually written.
    pub fn write_new(
        &self,
        relative: &Path,
        extension: &str,
        content: &[u8],
    ) -> Result<PathBuf, PersistError> {
        let base = self.root.join(relative);
        let parent = base.parent().unwrap_or(&self.root).to_path_buf();
        let stem = base
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| OsString::from("grab"));
        ensure_dir(&parent)?;

        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        for attempt in 0..=MAX_SUFFIX {
            let target = parent.join(candidate_name(&stem, extension, attempt));
            match tmp.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => tmp = err.file,
                Err(err) => return Err(PersistError::Io(err.error)),
            }
        }
        Err(PersistError::NoFreeName(base))
    }
}

fn candidate_name(stem: &OsString, extension: &str, attempt: u32) -> OsString {
    let mut name = stem.clone();
    if attempt > 0 {
        name.push(format!("-{attempt}"));
    }
    if !extension.is_empty() {
        name.push(".");
        name.push(extension);
    }
    name
}
