//! Conversation status classification.

use std::fmt;

use serde_json::Value;
use strum::{Display, EnumString};

/// Statuses after which the service makes no further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalStatus {
    Stopped,
    Failed,
    Error,
    Cancelled,
}

/// Status as reported by the conversation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationStatus {
    Terminal(TerminalStatus),
    /// Any non-terminal value (`RUNNING`, `STARTING`, ...), upper-cased.
    Active(String),
    /// The service answered without a usable status.
    Unknown,
}

impl ConversationStatus {
    /// Classify a raw `status` field. Missing, null and blank all map to `Unknown`.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Unknown,
            Some(Value::String(s)) => Self::parse(s),
            Some(other) => Self::parse(&other.to_string()),
        }
    }

    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() || normalized == "UNKNOWN" {
            return Self::Unknown;
        }
        match normalized.parse::<TerminalStatus>() {
            Ok(terminal) => Self::Terminal(terminal),
            Err(_) => Self::Active(normalized),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal(_))
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal(terminal) => write!(f, "{terminal}"),
            Self::Active(raw) => f.write_str(raw),
            Self::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

/// Last status seen during a run.
///
/// `None` means no status was ever observed, which is distinct from the
/// service reporting nothing (`Some(ConversationStatus::Unknown)`). Both
/// render as `UNKNOWN`.
pub type ObservedStatus = Option<ConversationStatus>;

/// Render an observed status for logs and step outputs.
pub fn status_label(status: &ObservedStatus) -> String {
    status
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| ConversationStatus::Unknown.to_string())
}

/// How a run should be reported to the automation platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ExitClass {
    /// Conversation stopped normally.
    Success,
    /// Conversation ended in `FAILED`, `ERROR` or `CANCELLED`.
    Failure,
    /// No terminal status was reached; reported as a warning.
    Indeterminate,
}

impl ExitClass {
    pub fn from_status(status: &ObservedStatus) -> Self {
        match status {
            Some(ConversationStatus::Terminal(TerminalStatus::Stopped)) => Self::Success,
            Some(ConversationStatus::Terminal(_)) => Self::Failure,
            _ => Self::Indeterminate,
        }
    }

    /// Process exit code; only `Failure` is non-zero.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Failure => 1,
            Self::Success | Self::Indeterminate => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn terminal_values_are_case_normalized() {
        assert_eq!(
            ConversationStatus::parse("stopped"),
            ConversationStatus::Terminal(TerminalStatus::Stopped)
        );
        assert_eq!(
            ConversationStatus::parse("Cancelled"),
            ConversationStatus::Terminal(TerminalStatus::Cancelled)
        );
        assert_eq!(
            ConversationStatus::parse("ERROR"),
            ConversationStatus::Terminal(TerminalStatus::Error)
        );
    }

    #[test]
    fn other_values_stay_active() {
        let status = ConversationStatus::parse("running");
        assert_eq!(status, ConversationStatus::Active("RUNNING".into()));
        assert!(!status.is_terminal());
        assert_eq!(status.to_string(), "RUNNING");
    }

    #[test]
    fn missing_or_null_status_is_unknown() {
        assert_eq!(ConversationStatus::from_json(None), ConversationStatus::Unknown);
        assert_eq!(
            ConversationStatus::from_json(Some(&Value::Null)),
            ConversationStatus::Unknown
        );
        assert_eq!(
            ConversationStatus::from_json(Some(&json!(""))),
            ConversationStatus::Unknown
        );
    }

    #[test]
    fn non_string_status_is_stringified() {
        assert_eq!(
            ConversationStatus::from_json(Some(&json!(3))),
            ConversationStatus::Active("3".into())
        );
    }

    #[test]
    fn never_observed_and_reported_unknown_render_the_same() {
        assert_eq!(status_label(&None), "UNKNOWN");
        assert_eq!(status_label(&Some(ConversationStatus::Unknown)), "UNKNOWN");
        assert_ne!(None, Some(ConversationStatus::Unknown));
    }

    #[test]
    fn exit_classification() {
        let of = |raw: &str| ExitClass::from_status(&Some(ConversationStatus::parse(raw)));
        assert_eq!(of("STOPPED"), ExitClass::Success);
        assert_eq!(of("FAILED"), ExitClass::Failure);
        assert_eq!(of("ERROR"), ExitClass::Failure);
        assert_eq!(of("CANCELLED"), ExitClass::Failure);
        assert_eq!(of("RUNNING"), ExitClass::Indeterminate);
        assert_eq!(ExitClass::from_status(&None), ExitClass::Indeterminate);

        assert_eq!(ExitClass::Failure.exit_code(), 1);
        assert_eq!(ExitClass::Success.exit_code(), 0);
        assert_eq!(ExitClass::Indeterminate.exit_code(), 0);
    }
}
