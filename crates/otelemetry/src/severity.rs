//! Fixed severity levels and their OpenTelemetry severity numbers.

use std::fmt;
use std::str::FromStr;

/// Ordered severity of a log record.
///
/// Rank and label are both derived from the variant, so they always travel
/// together. Ranks are the OpenTelemetry severity numbers of the first
/// sub-level of each range (`DEBUG` = 5, `INFO` = 9, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    /// Advisory only: emitting at this level never terminates the process.
    Fatal,
}

impl Severity {
    /// All levels in ascending order.
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
    ];

    /// Human-readable label carried as the record's severity text.
    pub const fn label(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// OpenTelemetry severity number.
    pub const fn rank(self) -> u8 {
        match self {
            Severity::Debug => 5,
            Severity::Info => 9,
            Severity::Warn => 13,
            Severity::Error => 17,
            Severity::Fatal => 21,
        }
    }

    pub(crate) fn to_otel(self) -> opentelemetry::logs::Severity {
        use opentelemetry::logs::Severity as Otel;
        match self {
            Severity::Debug => Otel::Debug,
            Severity::Info => Otel::Info,
            Severity::Warn => Otel::Warn,
            Severity::Error => Otel::Error,
            Severity::Fatal => Otel::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a label does not name one of the five levels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity label: {0:?}")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARN" | "WARNING" => Ok(Severity::Warn),
            "ERROR" => Ok(Severity::Error),
            "FATAL" => Ok(Severity::Fatal),
            _ => Err(ParseSeverityError(s.to_owned())),
        }
    }
}
