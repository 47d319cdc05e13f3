use chrono::Local;
use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

/// Log file, appended to across runs.
pub const LOG_FILE: &str = "train.log";

struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

/// Console + `train.log`. `RUST_LOG` overrides the default `info` filter.
/// If the log file cannot be opened only the console sink is installed.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = tfmt::layer().with_timer(LocalTime).with_target(false);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_FILE)
        .ok()
        .map(|f| tfmt::layer().with_timer(LocalTime).with_ansi(false).with_writer(Mutex::new(f)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already set");
    }
}

/// Numeric metric as structured fields: `scalar step=.. name=.. value=..`.
pub fn scalar(step: u64, name: &str, value: f32) {
    tracing::info!(target: "scalar", step, name, value);
}
