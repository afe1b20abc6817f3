//! Error taxonomy and the non-fatal error log.
//!
//! Public API policy
//! -----------------
//! An advisory engine must not panic or abort a query on bad input. Most
//! component functions therefore do not return `Result` at all: they push a
//! [`BandsError`] onto an [`ErrorLog`] and return a documented sentinel value
//! (empty bands, `NaN`/`±∞` resolution, [`crate::geom::invalid_vect3`]).
//! `CapacityExceeded` is the one variant that is fatal for the query that hit
//! it, since continuing would mean reporting bands computed from a silently
//! truncated interval set.

use thiserror::Error;

/// Everything that can go wrong feeding or running the bands engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BandsError {
    #[error("invalid input: {message} (value = {value})")]
    InvalidInput { message: String, value: f64 },

    #[error("unit mismatch for parameter `{key}`: existing unit `{existing}`, new unit `{new}`")]
    UnitMismatch {
        key: String,
        existing: String,
        new: String,
    },

    #[error("interval set capacity exceeded (limit = {limit})")]
    CapacityExceeded { limit: usize },

    #[error("recovery bands saturated after {shrinks} shrink attempt(s)")]
    Saturated { shrinks: u32 },

    #[error("bank angle {bank_rad} rad is out of range for a turn-radius computation")]
    NumericOutOfRange { bank_rad: f64 },
}

/// Severity of a record in the [`ErrorLog`]. Warnings never set the sticky
/// `has_error` flag; errors do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One recorded entry: what happened, and how bad it was.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

/// Size-bounded, ordered accumulator of non-fatal error/warning records.
///
/// Mirrors the reference `ErrorLog`/`ErrorReporter` split: `has_error()` is
/// sticky (never cleared by a subsequent warning), `message()` returns the
/// most recent entry, and the ring buffer discards the oldest entry once
/// `limit` is reached so a misbehaving caller can't grow this without bound.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    entries: Vec<LogEntry>,
    limit: usize,
    has_error: bool,
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ErrorLog {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
            has_error: false,
        }
    }

    /// Record `err` as an error (sets the sticky flag) and mirror it to the
    /// `log` facade at `warn` level so a deployment tailing process logs sees
    /// the same event a caller of `has_error()`/`message()` would.
    pub fn error(&mut self, err: &BandsError) {
        log::warn!("daidalus-core: {err}");
        self.push(Severity::Error, err.to_string());
    }

    /// Record `err` as a warning (does not set the sticky flag); mirrored at
    /// `debug` level.
    pub fn warning(&mut self, err: &BandsError) {
        log::debug!("daidalus-core: {err}");
        self.push(Severity::Warning, err.to_string());
    }

    fn push(&mut self, severity: Severity, message: String) {
        if severity == Severity::Error {
            self.has_error = true;
        }
        if self.entries.len() >= self.limit {
            self.entries.remove(0);
        }
        self.entries.push(LogEntry { severity, message });
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// The most recently recorded message, if any.
    pub fn message(&self) -> Option<&str> {
        self.entries.last().map(|e| e.message.as_str())
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Clear all entries and the sticky error flag. Used between independent
    /// test runs and by `DaidalusCore::clear_errors`.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.has_error = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sticky_error_flag_survives_later_warnings() {
        let mut log = ErrorLog::new(4);
        log.error(&BandsError::CapacityExceeded { limit: 400 });
        assert!(log.has_error());
        log.warning(&BandsError::UnitMismatch {
            key: "min_gs".into(),
            existing: "m/s".into(),
            new: "kn".into(),
        });
        assert!(log.has_error());
    }

    #[test]
    fn ring_buffer_drops_oldest() {
        let mut log = ErrorLog::new(2);
        log.warning(&BandsError::NumericOutOfRange { bank_rad: 1.6 });
        log.warning(&BandsError::NumericOutOfRange { bank_rad: 1.7 });
        log.warning(&BandsError::NumericOutOfRange { bank_rad: 1.8 });
        assert_eq!(log.entries().len(), 2);
        assert!(log.message().unwrap().contains("1.8"));
    }
}
