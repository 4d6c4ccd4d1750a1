use std::path::PathBuf;

use clap::Parser;
use engine_logging::LogDestination;
use log::LevelFilter;

/// Periodically grab a snapshot image from a webcam URL.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "camgrab", version, about)]
pub struct Args {
    /// Snapshot URL, e.g. http://camera.local/out.jpg
    pub url: Option<String>,

    /// Snapshot URL, as a flag
    #[arg(long = "url", value_name = "URL", conflicts_with = "url")]
    pub url_flag: Option<String>,

    /// RON file with grab settings; flags override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Seconds between grabs
    #[arg(long, value_name = "SECONDS")]
    pub every: Option<f64>,

    /// Directory to save images into
    #[arg(long, value_name = "DIR", conflicts_with = "no_save")]
    pub save_dir: Option<PathBuf>,

    /// Do not save images
    #[arg(long)]
    pub no_save: bool,

    /// Save path template, e.g. "{Y}-{m}{d}/{H}{M}{S}-{f}"
    #[arg(long, value_name = "TEMPLATE")]
    pub filename: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Also tolerate this HTTP status (repeatable)
    #[arg(long = "ignore", value_name = "CODE")]
    pub ignore: Vec<u16>,

    /// Stop tolerating this HTTP status (repeatable)
    #[arg(long = "no-ignore", value_name = "CODE")]
    pub no_ignore: Vec<u16>,

    /// Treat request timeouts as fatal
    #[arg(long)]
    pub no_ignore_timeout: bool,

    /// Stop after this many grabs
    #[arg(long, value_name = "N")]
    pub count: Option<u64>,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print one JSON line per grab to stdout
    #[arg(long)]
    pub report_json: bool,
}

impl Args {
    pub fn target_url(&self) -> Option<&str> {
        self.url.as_deref().or(self.url_flag.as_deref())
    }

    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
