//! Trajectory events and last-agent-message extraction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::EnumString;

use crate::error::{ConvoyError, Result};

/// Source tag of events produced by the remote agent.
pub const AGENT_SOURCE: &str = "agent";

/// Agent actions that count as an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum UtteranceAction {
    Message,
    Finish,
}

/// One entry of a conversation trajectory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub args: Option<Map<String, Value>>,
    #[serde(default)]
    pub extras: Option<Map<String, Value>>,
}

impl Event {
    /// Whether this is a final-output candidate: an agent `message` or `finish`.
    pub fn is_agent_utterance(&self) -> bool {
        is_agent_utterance(self.source.as_deref(), self.action.as_deref())
    }
}

fn is_agent_utterance(source: Option<&str>, action: Option<&str>) -> bool {
    source == Some(AGENT_SOURCE)
        && action.is_some_and(|a| a.parse::<UtteranceAction>().is_ok())
}

/// The final agent utterance of a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastAgentMessage {
    pub action: String,
    pub message: String,
    pub timestamp: Option<Value>,
    pub args: Map<String, Value>,
    pub extras: Map<String, Value>,
}

impl LastAgentMessage {
    fn from_event(event: &Event) -> Self {
        Self {
            action: event.action.clone().unwrap_or_default(),
            message: event.message.clone().unwrap_or_default(),
            timestamp: event.timestamp.clone().filter(|t| !t.is_null()),
            args: event.args.clone().unwrap_or_default(),
            extras: event.extras.clone().unwrap_or_default(),
        }
    }

    /// Build from a raw event record, tolerating unexpected field types.
    ///
    /// Non-string `action`/`message` values are rendered as JSON text;
    /// `args`/`extras` that are not objects become empty maps.
    fn from_record(record: &Map<String, Value>) -> Self {
        let text = |key: &str| match record.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        let object = |key: &str| {
            record
                .get(key)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default()
        };
        Self {
            action: text("action"),
            message: text("message"),
            timestamp: record.get("timestamp").filter(|t| !t.is_null()).cloned(),
            args: object("args"),
            extras: object("extras"),
        }
    }

    /// Timestamp rendered for display; strings are shown without quotes.
    pub fn timestamp_label(&self) -> Option<String> {
        match self.timestamp.as_ref()? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// First `max_chars` characters of the message, with `...` when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.message.char_indices().nth(max_chars) {
            Some((end, _)) => format!("{}...", &self.message[..end]),
            None => self.message.clone(),
        }
    }
}

/// Find the last agent `message`/`finish` event.
///
/// Scans from the end, so the cost is the distance from the end to the
/// match rather than the length of the trajectory.
pub fn last_agent_message(events: &[Event]) -> Option<LastAgentMessage> {
    events
        .iter()
        .rev()
        .find(|event| event.is_agent_utterance())
        .map(LastAgentMessage::from_event)
}

/// Same backward scan over a raw trajectory document (`{"events": [...]}`).
///
/// Only the entries visited before the match are inspected. A visited entry
/// that is not a JSON object is a `MalformedTrajectory` error; no match is
/// `Ok(None)`.
pub fn extract_last_agent_message(trajectory: &Value) -> Result<Option<LastAgentMessage>> {
    let Some(document) = trajectory.as_object() else {
        return Err(ConvoyError::MalformedTrajectory(
            "trajectory is not a JSON object".into(),
        ));
    };
    let events = match document.get("events") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(events)) => events,
        Some(_) => {
            return Err(ConvoyError::MalformedTrajectory(
                "`events` is not an array".into(),
            ))
        }
    };

    for (index, entry) in events.iter().enumerate().rev() {
        let Some(record) = entry.as_object() else {
            return Err(ConvoyError::MalformedTrajectory(format!(
                "events[{index}] is not an object"
            )));
        };
        let source = record.get("source").and_then(Value::as_str);
        let action = record.get("action").and_then(Value::as_str);
        if !is_agent_utterance(source, action) {
            continue;
        }
        return Ok(Some(LastAgentMessage::from_record(record)));
    }
    Ok(None)
}

/// Extraction that never fails: malformed input is logged and reported as
/// "no message found".
pub fn extract_or_warn(trajectory: &Value) -> Option<LastAgentMessage> {
    match extract_last_agent_message(trajectory) {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(error = %e, "failed to extract last agent message");
            None
        }
    }
}
