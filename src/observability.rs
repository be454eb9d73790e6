//! This module provides observability and diagnostics for the column writers
//! and readers.
//!
//! Library code only talks to the `log` facade. `enable_verbose_logging`
//! installs an `env_logger` backend for binaries, benches and debugging
//! sessions, and the `log_metric!` macro emits structured key/value lines.

use std::fs::OpenOptions;
use std::sync::Once;

use log::LevelFilter;

use crate::error::MosaicError;

static INIT_LOGGER: Once = Once::new();

/// Logs a structured key-value metric line at `debug` level.
///
/// # Example
/// ```
/// use mosaic_codec::log_metric;
/// let pixels = 4;
/// log_metric!("event"="flush_chunk", "column"="Int64", "pixels"=&pixels);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if log::log_enabled!(log::Level::Debug) {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            log::debug!("MOSAIC_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

/// Installs a process-wide `env_logger` at `level`, optionally appending to
/// `log_file` instead of stderr. Only the first call has an effect.
pub fn enable_verbose_logging(level: LevelFilter, log_file: Option<&str>) -> Result<(), MosaicError> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().append(true).create(true).open(path)?),
        None => None,
    };

    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(level);
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())
        });
        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        let _ = builder.try_init();
    });
    Ok(())
}
