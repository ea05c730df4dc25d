//! Process-wide logger registry.
//!
//! Components that receive a [`Logger`] explicitly should use it; the
//! registry backs the free functions and the macros without a `logger:`
//! argument. Replacement is an atomic pointer swap, so readers on other
//! threads always see either the old or the new logger.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use crate::observability::caller::CallSite;
use crate::observability::field::Field;
use crate::observability::level::Level;
use crate::observability::logging::Logger;

static GLOBAL_LOGGER: OnceLock<ArcSwap<Logger>> = OnceLock::new();

fn registry() -> &'static ArcSwap<Logger> {
    GLOBAL_LOGGER.get_or_init(|| ArcSwap::from_pointee(Logger::new(Level::Info)))
}

/// Replace the active global logger.
pub fn set_global_logger(logger: Logger) {
    registry().store(Arc::new(logger));
}

/// Current global logger. Defaults to stdout at `Info`.
pub fn global_logger() -> Arc<Logger> {
    registry().load_full()
}

#[track_caller]
pub fn debug(msg: &str, fields: &[Field]) {
    global_logger().log(Level::Debug, msg, fields, CallSite::caller());
}

#[track_caller]
pub fn info(msg: &str, fields: &[Field]) {
    global_logger().log(Level::Info, msg, fields, CallSite::caller());
}

#[track_caller]
pub fn warn(msg: &str, fields: &[Field]) {
    global_logger().log(Level::Warn, msg, fields, CallSite::caller());
}

#[track_caller]
pub fn error(msg: &str, fields: &[Field]) {
    global_logger().log(Level::Error, msg, fields, CallSite::caller());
}

#[track_caller]
pub fn fatal(msg: &str, fields: &[Field]) {
    global_logger().log(Level::Fatal, msg, fields, CallSite::caller());
}

pub fn with_field(key: impl Into<Cow<'static, str>>, value: impl fmt::Display) -> Logger {
    global_logger().with_field(key, value)
}

pub fn with_fields<I>(fields: I) -> Logger
where
    I: IntoIterator,
    I::Item: Into<Field>,
{
    global_logger().with_fields(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::sink::MemoryWriter;

    // Single test so parallel tests never observe a half-swapped registry.
    #[test]
    fn global_functions_are_late_bound() {
        let previous = global_logger();

        let first = MemoryWriter::new();
        set_global_logger(Logger::builder().writer(first.clone()).caller(false).build());
        info("one", &[]);

        let second = MemoryWriter::new();
        set_global_logger(Logger::builder().writer(second.clone()).caller(false).build());
        info("two", &[Field::new("k", "v")]);
        debug("hidden", &[]);
        with_field("scope", "sub").warn("three", &[]);

        assert!(first.contents().ends_with(" [INFO] one\n"));
        let lines = second.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" [INFO] two k=v"));
        assert!(lines[1].ends_with(" [WARN] three scope=sub"));

        set_global_logger((*previous).clone());
    }
}
