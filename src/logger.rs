//! Sink for the client's request log lines.
//!
//! Every method has a no-op default, so a sink only implements the levels it
//! cares about and the client never has to check what is available.

/// Log target used by [`LogFacade`].
pub const LOG_TARGET: &str = "engine_client";

pub trait EngineLog: Send + Sync {
    fn info(&self, _msg: &str) {}
    fn debug(&self, _msg: &str) {}
    fn error(&self, _msg: &str) {}
}

/// Forwards to the `log` crate under the `engine_client` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacade;

impl EngineLog for LogFacade {
    fn info(&self, msg: &str) {
        log::info!(target: LOG_TARGET, "{}", msg);
    }

    fn debug(&self, msg: &str) {
        log::debug!(target: LOG_TARGET, "{}", msg);
    }

    fn error(&self, msg: &str) {
        log::error!(target: LOG_TARGET, "{}", msg);
    }
}

/// Controls the line logged when a request completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMarker {
    /// Log nothing on success.
    Suppress,
    /// Append this text to the success line. Empty by default.
    Suffix(String),
}

impl Default for LogMarker {
    fn default() -> Self {
        LogMarker::Suffix(String::new())
    }
}

impl LogMarker {
    /// The line to log for a completed request, if any.
    pub fn completion_line(&self, method: &str, url: &str, retried: bool) -> Option<String> {
        let LogMarker::Suffix(suffix) = self else {
            return None;
        };
        if retried {
            Some(format!("es> {} {} OK {} (After retry)", method, url, suffix))
        } else {
            Some(format!("es> {} {} OK {}", method, url, suffix))
        }
    }
}

impl From<&str> for LogMarker {
    fn from(value: &str) -> Self {
        LogMarker::Suffix(value.to_string())
    }
}

impl From<String> for LogMarker {
    fn from(value: String) -> Self {
        LogMarker::Suffix(value)
    }
}

/// `None` suppresses the line.
impl<S: Into<String>> From<Option<S>> for LogMarker {
    fn from(value: Option<S>) -> Self {
        match value {
            Some(suffix) => LogMarker::Suffix(suffix.into()),
            None => LogMarker::Suppress,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_marker_logs_empty_suffix() {
        let line = LogMarker::default().completion_line("GET", "http://e/x", false);
        assert_eq!(line.as_deref(), Some("es> GET http://e/x OK "));
    }

    #[test]
    fn test_marker_suffix_verbatim() {
        let line = LogMarker::from("(42 rows)").completion_line("POST", "http://e/x", false);
        assert_eq!(line.as_deref(), Some("es> POST http://e/x OK (42 rows)"));
    }

    #[test]
    fn test_marker_after_retry() {
        let line = LogMarker::from("m").completion_line("PUT", "http://e/x", true);
        assert_eq!(line.as_deref(), Some("es> PUT http://e/x OK m (After retry)"));
    }

    #[test]
    fn test_suppress_marker() {
        assert_eq!(LogMarker::from(None::<&str>), LogMarker::Suppress);
        assert_eq!(LogMarker::Suppress.completion_line("GET", "u", false), None);
        assert_eq!(LogMarker::Suppress.completion_line("GET", "u", true), None);
    }

    #[test]
    fn test_marker_from_option_some() {
        assert_eq!(LogMarker::from(Some("x")), LogMarker::Suffix("x".to_string()));
    }

    #[test]
    fn test_missing_levels_are_dropped() {
        struct Silent;
        impl EngineLog for Silent {}

        let log = Silent;
        log.info("a");
        log.debug("b");
        log.error("d");
    }

    #[test]
    fn test_log_facade_does_not_panic_without_logger() {
        let log = LogFacade;
        log.info("info");
        log.error("error");
    }
}
