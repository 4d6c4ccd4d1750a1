use engine_logging::engine_info;

use crate::persist::AtomicFileWriter;
use crate::{GrabError, Grabber, OutcomeRecord};

/// A step run on every outcome after the fetch, in chain order.
///
/// `record.image` is `None` whenever the fetch was tolerated as a failure or
/// an earlier handler removed it; implementations should do nothing in that
/// case. Errors abort the tick.
pub trait Handler: Send + Sync {
    fn name(&self) -> &str;

    fn handle(&self, record: &mut OutcomeRecord, grabber: &Grabber) -> Result<(), GrabError>;
}

/// Persists the image below the configured save directory.
///
/// Part of the default chain; a grabber whose chain omits it never saves.
#[derive(Debug, Default, Clone, Copy)]
pub struct SaveHandler;

impl Handler for SaveHandler {
    fn name(&self) -> &str {
        "save"
    }

    fn handle(&self, record: &mut OutcomeRecord, grabber: &Grabber) -> Result<(), GrabError> {
        let settings = grabber.settings();
        if !settings.saving_enabled() {
            return Ok(());
        }
        let (Some(dir), Some(image)) = (settings.save_dir.as_ref(), record.image.as_ref()) else {
            return Ok(());
        };

        let codec = grabber.codec();
        let bytes = codec.encode(image).map_err(GrabError::Encode)?;
        let relative = settings
            .save_filename
            .render(&record.timestamp, &record.source_url);

        let writer = AtomicFileWriter::new(dir.clone());
        let path = writer.write_new(&relative, codec.extension(), &bytes)?;
        engine_info!(
            "tick {} saved {} bytes to {}",
            record.tick,
            bytes.len(),
            path.display()
        );

        record.save_directory = Some(dir.clone());
        record.save_path = Some(path);
        record.is_saved = true;
        Ok(())
    }
}

/// Logs a one-line summary of each outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHandler;

impl Handler for LogHandler {
    fn name(&self) -> &str {
        "log"
    }

    fn handle(&self, record: &mut OutcomeRecord, _grabber: &Grabber) -> Result<(), GrabError> {
        match (record.dimensions(), record.error.as_ref()) {
            (Some((w, h)), _) => engine_info!(
                "tick {} status={:?} image={}x{} saved={} path={:?}",
                record.tick,
                record.raw_status,
                w,
                h,
                record.is_saved,
                record.save_path
            ),
            (None, Some(err)) => engine_info!(
                "tick {} status={:?} no image: {}",
                record.tick,
                record.raw_status,
                err
            ),
            (None, None) => engine_info!(
                "tick {} status={:?} no image",
                record.tick,
                record.raw_status
            ),
        }
        Ok(())
    }
}

/// Adapts a closure into a [`Handler`].
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut OutcomeRecord, &Grabber) -> Result<(), GrabError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, record: &mut OutcomeRecord, grabber: &Grabber) -> Result<(), GrabError> {
        (self.f)(record, grabber)
    }
}

pub fn handler_fn<F>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    F: Fn(&mut OutcomeRecord, &Grabber) -> Result<(), GrabError> + Send + Sync,
{
    FnHandler {
        name: name.into(),
        f,
    }
}
