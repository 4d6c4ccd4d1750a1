use std::io::Write;
use std::sync::Mutex;

use camgrab_engine::{GrabError, Grabber, Handler, OutcomeRecord};

const NAME: &str = "json-report";

/// Writes each outcome summary as one JSON line.
pub struct JsonReportHandler<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonReportHandler<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Handler for JsonReportHandler<W> {
    fn name(&self) -> &str {
        NAME
    }

    fn handle(&self, record: &mut OutcomeRecord, _grabber: &Grabber) -> Result<(), GrabError> {
        let line = serde_json::to_string(&record.summary())
            .map_err(|err| GrabError::handler(NAME, err))?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| GrabError::handler(NAME, anyhow::anyhow!("report writer poisoned")))?;
        writeln!(out, "{line}").map_err(|err| GrabError::handler(NAME, err))?;
        out.flush().map_err(|err| GrabError::handler(NAME, err))
    }
}
