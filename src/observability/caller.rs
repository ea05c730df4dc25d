//! Call-site attribution for log records.
//!
//! The call site is captured where the log call is written rather than by
//! walking the stack: the logging macros inject `file!()`, `line!()` and the
//! enclosing function's path, and the `Logger` methods fall back to
//! `#[track_caller]` locations (file and line only).

use std::fmt;
use std::panic::Location;

/// Marker function name used by [`call_site!`](crate::call_site) to locate the
/// enclosing function path.
#[doc(hidden)]
pub const MARKER_NAME: &str = "__call_site_marker";

/// Source location of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    file: &'static str,
    line: u32,
    function: Option<&'static str>,
}

impl CallSite {
    /// Build a call site from macro-provided parts. `function` is the full
    /// type path of the marker function declared inside the caller.
    pub const fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function: Some(function),
        }
    }

    /// Call site of the caller of the current `#[track_caller]` function.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            function: None,
        }
    }

    /// File name with any directory stripped.
    pub fn file_name(&self) -> &'static str {
        self.file
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(self.file)
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Final identifier of the enclosing function, with module prefix,
    /// closure and marker segments removed.
    pub fn function_name(&self) -> Option<&'static str> {
        let path = self.function?;
        let path = path
            .strip_suffix(MARKER_NAME)
            .map(|p| p.trim_end_matches("::"))
            .unwrap_or(path);

        path.split("::")
            .filter(|segment| !segment.is_empty() && !segment.starts_with("{{"))
            .last()
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_name(), self.line)?;
        if let Some(function) = self.function_name() {
            write!(f, " ({})", function)?;
        }
        Ok(())
    }
}

/// Capture the current source location, including the enclosing function.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::observability::CallSite::new(::std::file!(), ::std::line!(), {
            fn __call_site_marker() {}
            fn __type_name_of<T>(_: T) -> &'static str {
                ::std::any::type_name::<T>()
            }
            __type_name_of(__call_site_marker)
        })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_directories_from_file() {
        let site = CallSite::new("src/http/webhook.rs", 12, "x::y::__call_site_marker");
        assert_eq!(site.file_name(), "webhook.rs");

        let windows = CallSite::new("src\\http\\webhook.rs", 12, "f");
        assert_eq!(windows.file_name(), "webhook.rs");
    }

    #[test]
    fn keeps_only_final_function_identifier() {
        let site = CallSite::new(
            "src/http/webhook.rs",
            40,
            "confluence_hook::http::webhook::handle_confluence_webhook::{{closure}}::__call_site_marker",
        );
        assert_eq!(site.function_name(), Some("handle_confluence_webhook"));
        assert_eq!(site.to_string(), "webhook.rs:40 (handle_confluence_webhook)");
    }

    #[test]
    fn macro_captures_enclosing_function() {
        fn emitting_function() -> CallSite {
            crate::call_site!()
        }

        let site = emitting_function();
        assert_eq!(site.file_name(), "caller.rs");
        assert_eq!(site.function_name(), Some("emitting_function"));
    }

    #[test]
    fn track_caller_has_no_function() {
        let site = CallSite::caller();
        assert_eq!(site.file_name(), "caller.rs");
        assert_eq!(site.function_name(), None);
        assert!(!site.to_string().contains('('));
    }
}
