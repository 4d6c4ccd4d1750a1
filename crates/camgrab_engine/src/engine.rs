use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use camgrab_core::{Classification, FailureKind, GrabSettings, SettingsError, Stage};
use chrono::{DateTime, Local};
use engine_logging::{engine_debug, engine_error, engine_info, engine_trace, engine_warn};
use image::DynamicImage;
use tokio_util::sync::CancellationToken;

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::{FetchError, GrabError, Handler, ImageCodec, JpegCodec, OutcomeRecord, SaveHandler};

/// Source of tick timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

/// Result of the fetch/decode stage.
enum FetchVerdict {
    Decoded(DynamicImage),
    Tolerated(FetchError),
    Fatal(GrabError),
}

/// Polls one webcam URL: fetch, decode, then hand the outcome to each handler.
///
/// Ticks never overlap. Settings and the handler chain can only be changed
/// through `&mut self`, so they cannot change under a running tick.
pub struct Grabber {
    settings: GrabSettings,
    fetcher: Arc<dyn Fetcher>,
    codec: Arc<dyn ImageCodec>,
    clock: Clock,
    handlers: Vec<Arc<dyn Handler>>,
    ticks: AtomicU64,
}

impl Grabber {
    /// Grabber with the reqwest transport, JPEG codec and default chain.
    pub fn new(settings: GrabSettings) -> Result<Self, SettingsError> {
        GrabberBuilder::new(settings).build()
    }

    pub fn builder(settings: GrabSettings) -> GrabberBuilder {
        GrabberBuilder::new(settings)
    }

    pub fn settings(&self) -> &GrabSettings {
        &self.settings
    }

    /// Transport settings (timeout, size limit) are fixed when the grabber is
    /// built; everything else takes effect on the next tick.
    pub fn settings_mut(&mut self) -> &mut GrabSettings {
        &mut self.settings
    }

    pub fn codec(&self) -> &dyn ImageCodec {
        self.codec.as_ref()
    }

    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    /// Replace the whole chain. Saving only happens if it contains a [`SaveHandler`].
    pub fn set_handlers(&mut self, handlers: Vec<Arc<dyn Handler>>) {
        self.handlers = handlers;
    }

    pub fn push_handler(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.push(handler);
    }

    /// Number of ticks started so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Run one grab cycle and return its outcome.
    ///
    /// Tolerated network failures are recorded on the outcome; every other
    /// failure is returned as an error.
    pub async fn tick(&self) -> Result<OutcomeRecord, GrabError> {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        let mut record = OutcomeRecord::new(
            tick,
            self.settings.url.clone(),
            (self.clock)(),
            self.settings.save_dir.clone(),
        );
        engine_debug!("tick {} start url={}", tick, record.source_url);

        match self.fetch_and_decode(&mut record).await {
            FetchVerdict::Decoded(image) => record.image = Some(image),
            FetchVerdict::Tolerated(error) => {
                engine_warn!("tick {} tolerated failure: {}", tick, error);
                record.error = Some(error);
            }
            FetchVerdict::Fatal(err) => {
                engine_error!(
                    "tick {} failed at {}: {}",
                    tick,
                    record.stage.as_str(),
                    err
                );
                return Err(err);
            }
        }

        record.stage = Stage::Dispatching;
        self.dispatch(&mut record).inspect_err(|err| {
            engine_error!("tick {} handler failure: {}", tick, err);
        })?;

        record.stage = Stage::Done;
        engine_debug!(
            "tick {} done image={} saved={}",
            tick,
            record.has_image(),
            record.is_saved
        );
        Ok(record)
    }

    /// Tick, sleep `every`, repeat.
    ///
    /// Cancellation is honoured between ticks only; a started tick always
    /// finishes. Stops after `max_ticks` if set. Returns the number of ticks
    /// completed, or the first fatal error. Settings are re-validated first,
    /// since they may have been edited through `settings_mut`.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<u64, GrabError> {
        self.settings.validate()?;
        let interval = self.settings.interval();
        let max_ticks = self.settings.max_ticks;
        engine_info!(
            "grabbing {} every {:?} save_dir={:?}",
            self.settings.url,
            interval,
            self.settings.save_dir
        );

        let mut completed = 0u64;
        loop {
            if cancel.is_cancelled() || max_ticks.is_some_and(|max| completed >= max) {
                break;
            }
            self.tick().await?;
            completed += 1;
            if max_ticks.is_some_and(|max| completed >= max) {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }

        engine_info!("grab loop stopped after {} ticks", completed);
        Ok(completed)
    }

    async fn fetch_and_decode(&self, record: &mut OutcomeRecord) -> FetchVerdict {
        record.stage = Stage::Fetching;
        let output = match self.fetcher.fetch(&record.source_url).await {
            Ok(output) => output,
            Err(err) => {
                record.raw_status = err.status_code();
                return self.classify(err);
            }
        };

        record.raw_status = Some(output.status);
        record.final_url = Some(output.metadata.final_url.clone());
        record.content_type = output.metadata.content_type.clone();

        if !output.is_success() {
            let err = FetchError::new(
                FailureKind::HttpStatus(output.status),
                format!("unexpected status {}", output.status),
            );
            return self.classify(err);
        }

        record.stage = Stage::Decoding;
        engine_trace!(
            "tick {} decoding {} bytes ({:?})",
            record.tick,
            output.bytes.len(),
            record.content_type
        );
        match self.codec.decode(&output.bytes) {
            Ok(image) => FetchVerdict::Decoded(image),
            Err(err) => FetchVerdict::Fatal(GrabError::Decode(err)),
        }
    }

    fn classify(&self, err: FetchError) -> FetchVerdict {
        match self.settings.policy.classify(&err.kind) {
            Classification::Tolerated => FetchVerdict::Tolerated(err),
            Classification::Fatal => FetchVerdict::Fatal(GrabError::Network(err)),
        }
    }

    fn dispatch(&self, record: &mut OutcomeRecord) -> Result<(), GrabError> {
        for handler in &self.handlers {
            engine_trace!("tick {} -> handler {}", record.tick, handler.name());
            handler.handle(record, self)?;
        }
        Ok(())
    }
}

/// Assembles a [`Grabber`].
///
/// The chain is `default_handlers` (initially just [`SaveHandler`]) followed
/// by `extra_handlers`, unless [`GrabberBuilder::handlers`] replaced it.
pub struct GrabberBuilder {
    settings: GrabSettings,
    fetcher: Option<Arc<dyn Fetcher>>,
    codec: Option<Arc<dyn ImageCodec>>,
    clock: Option<Clock>,
    default_handlers: Vec<Arc<dyn Handler>>,
    extra_handlers: Vec<Arc<dyn Handler>>,
    replacement: Option<Vec<Arc<dyn Handler>>>,
}

impl GrabberBuilder {
    pub fn new(settings: GrabSettings) -> Self {
        let save: Arc<dyn Handler> = Arc::new(SaveHandler);
        Self {
            settings,
            fetcher: None,
            codec: None,
            clock: None,
            default_handlers: vec![save],
            extra_handlers: Vec::new(),
            replacement: None,
        }
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn default_handlers(mut self, handlers: Vec<Arc<dyn Handler>>) -> Self {
        self.default_handlers = handlers;
        self
    }

    /// Appended after the default handlers.
    pub fn extra_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.extra_handlers.push(handler);
        self
    }

    pub fn extra_handlers(mut self, handlers: impl IntoIterator<Item = Arc<dyn Handler>>) -> Self {
        self.extra_handlers.extend(handlers);
        self
    }

    /// Use exactly this chain, ignoring defaults and extras.
    pub fn handlers(mut self, handlers: Vec<Arc<dyn Handler>>) -> Self {
        self.replacement = Some(handlers);
        self
    }

    pub fn build(self) -> Result<Grabber, SettingsError> {
        self.settings.validate()?;

        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(ReqwestFetcher::new(FetchSettings::from_grab_settings(
                &self.settings,
            ))),
        };
        let codec: Arc<dyn ImageCodec> = match self.codec {
            Some(codec) => codec,
            None => Arc::new(JpegCodec::default()),
        };
        let clock: Clock = match self.clock {
            Some(clock) => clock,
            None => Arc::new(Local::now),
        };
        let handlers = match self.replacement {
            Some(handlers) => handlers,
            None => {
                let mut chain = self.default_handlers;
                chain.extend(self.extra_handlers);
                chain
            }
        };

        Ok(Grabber {
            settings: self.settings,
            fetcher,
            codec,
            clock,
            handlers,
            ticks: AtomicU64::new(0),
        })
    }
}
