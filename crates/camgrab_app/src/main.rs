mod cli;
mod config;
mod report;

use std::sync::Arc;

use anyhow::Context;
use camgrab_engine::{CancellationToken, Grabber, LogHandler};
use clap::Parser;
use engine_logging::{engine_error, engine_info, engine_warn};

use crate::cli::Args;
use crate::report::JsonReportHandler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    engine_logging::initialize(args.log_destination(), args.log_level());

    let settings = config::resolve_settings(&args)?;
    let mut builder = Grabber::builder(settings).extra_handler(Arc::new(LogHandler));
    if args.report_json {
        builder = builder.extra_handler(Arc::new(JsonReportHandler::new(std::io::stdout())));
    }
    let grabber = builder.build().context("invalid grab settings")?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    engine_info!("Ctrl-C received, stopping after the current tick");
                    cancel.cancel();
                }
                Err(err) => engine_warn!("Could not listen for Ctrl-C: {}", err),
            }
        });
    }

    match grabber.run(&cancel).await {
        Ok(completed) => {
            engine_info!("Finished after {} ticks", completed);
            Ok(())
        }
        Err(err) => {
            engine_error!("Stopping on {}: {}", err.category(), err);
            Err(err.into())
        }
    }
}
