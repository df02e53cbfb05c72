//! Terminal logger.
//!
//! Info lines print bare, warnings and errors get a level prefix, and debug
//! or trace lines also carry their source location. `RUST_LOG` overrides
//! the default level.

use std::io::Write;

struct CliLogger(env_logger::Logger);

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.0.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.0.log(record);
        }
    }

    fn flush(&self) {
        self.0.flush();
    }
}

fn prefix(level: log::Level) -> Option<&'static str> {
    match level {
        log::Level::Error => Some("error"),
        log::Level::Warn => Some("warning"),
        log::Level::Info => None,
        log::Level::Debug => Some("debug"),
        log::Level::Trace => Some("trace"),
    }
}

/// Install the logger. A second call is a no-op.
pub fn init(maybe_level: Option<log::Level>) {
    let log_level = maybe_level.unwrap_or(log::Level::Info);
    let logger = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.to_level_filter().to_string()),
    )
    .format(|buf, record| match prefix(record.level()) {
        None => writeln!(buf, "{}", record.args()),
        Some(p) if record.level() <= log::Level::Warn => writeln!(buf, "{p}: {}", record.args()),
        Some(p) => {
            let mut target = record.target().to_string();
            if let Some(line_no) = record.line() {
                target.push(':');
                target.push_str(&line_no.to_string());
            }
            writeln!(buf, "{p} {target} - {}", record.args())
        }
    })
    .build();

    let max_level = logger.filter();
    if log::set_boxed_logger(Box::new(CliLogger(logger))).is_ok() {
        log::set_max_level(max_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_info_is_unprefixed() {
        assert_eq!(prefix(log::Level::Info), None);
        assert_eq!(prefix(log::Level::Warn), Some("warning"));
        assert_eq!(prefix(log::Level::Error), Some("error"));
    }

    #[test]
    fn init_twice_is_harmless() {
        init(Some(log::Level::Warn));
        init(None);
        log::warn!("still logging");
    }
}
