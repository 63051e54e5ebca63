use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger;
static STDERR_LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(
        &self,
        metadata: &Metadata<'_>,
    ) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(
        &self,
        record: &Record<'_>,
    ) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

pub fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = log::set_logger(&STDERR_LOGGER).map(|_| log::set_max_level(level));
}
