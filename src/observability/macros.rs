//! Logging macros with call-site capture.
//!
//! ```ignore
//! info!("Server listening", "port" => port);
//! warn!(logger: state.logger, "Slow request", "elapsed_ms" => ms);
//! ```
//!
//! Field values are only rendered when the level is enabled.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_event {
    ($logger:expr, $level:expr, $msg:expr $(, $key:expr => $value:expr)*) => {{
        let __logger: &$crate::observability::Logger = &$logger;
        let __level: $crate::observability::Level = $level;
        if __logger.enabled(__level) {
            __logger.log(
                __level,
                ::std::convert::AsRef::<str>::as_ref(&$msg),
                &[$($crate::observability::Field::new($key, &$value)),*],
                $crate::call_site!(),
            );
        }
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log_dispatch {
    ($level:expr; logger: $logger:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__log_event!($logger, $level, $msg $(, $key => $value)*)
    };
    ($level:expr; $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        let __global = $crate::observability::global_logger();
        $crate::__log_event!(__global, $level, $msg $(, $key => $value)*)
    }};
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::__log_dispatch!($crate::observability::Level::Debug; $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::__log_dispatch!($crate::observability::Level::Info; $($arg)+)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::__log_dispatch!($crate::observability::Level::Warn; $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::__log_dispatch!($crate::observability::Level::Error; $($arg)+)
    };
}

/// Write a fatal record and terminate the process.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {
        $crate::__log_dispatch!($crate::observability::Level::Fatal; $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::observability::{Level, Logger, MemoryWriter};
    use std::cell::Cell;
    use std::fmt;

    fn logger(level: Level, out: &MemoryWriter) -> Logger {
        Logger::builder().level(level).writer(out.clone()).build()
    }

    #[test]
    fn macro_records_function_name() {
        let out = MemoryWriter::new();
        let log = logger(Level::Debug, &out);

        crate::info!(logger: log, "created", "page_id" => 7, "title" => "Home");

        let line = out.contents();
        assert!(
            line.contains(" [INFO] created page_id=7 title=Home caller=macros.rs:"),
            "{}",
            line
        );
        assert!(line.ends_with(" (macro_records_function_name)\n"), "{}", line);
    }

    #[test]
    fn accepts_owned_messages_and_trailing_comma() {
        let out = MemoryWriter::new();
        let log = logger(Level::Debug, &out);
        let msg = format!("page {}", 3);

        crate::warn!(logger: log, msg, "a" => 1,);
        crate::error!(logger: &log, "plain");

        let lines = out.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" [WARN] page 3 a=1 caller="));
        assert!(lines[1].contains(" [ERROR] plain caller="));
    }

    struct Counting<'a>(&'a Cell<u32>);

    impl fmt::Display for Counting<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            self.0.set(self.0.get() + 1);
            f.write_str("counted")
        }
    }

    #[test]
    fn disabled_level_skips_field_rendering() {
        let out = MemoryWriter::new();
        let log = logger(Level::Error, &out);
        let renders = Cell::new(0);

        crate::debug!(logger: log, "quiet", "value" => Counting(&renders));
        assert_eq!(renders.get(), 0);
        assert!(out.is_empty());

        crate::error!(logger: log, "loud", "value" => Counting(&renders));
        assert_eq!(renders.get(), 1);
        assert!(out.contents().contains(" value=counted "));
    }
}
