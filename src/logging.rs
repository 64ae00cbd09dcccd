//! Serial logger for the `log` facade
//!
//! On the board there is no `env_logger`: records are formatted straight
//! into whatever `fmt::Write` sink the firmware hands over (usually the
//! USB CDC or UART writer). The sink sits behind a spin lock so records
//! from interrupt context and the frame loop do not interleave.
use core::fmt::Write;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

type Sink = &'static mut (dyn Write + Send);

static SINK: Mutex<Option<Sink>> = Mutex::new(None);
static LOGGER: SerialLogger = SerialLogger;

struct SerialLogger;

impl Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(sink) = SINK.lock().as_mut() {
            let _ = writeln!(sink, "[{} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the serial logger. Fails if any logger is already installed,
/// in which case `sink` is not kept.
pub fn init(sink: Sink, level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    *SINK.lock() = Some(sink);
    log::set_max_level(level);
    Ok(())
}

/// Take the sink back; later records are dropped
pub fn detach() -> Option<Sink> {
    SINK.lock().take()
}
