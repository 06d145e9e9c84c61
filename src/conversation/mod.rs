//! Conversation lifecycle: create, poll to a terminal status, collect the trajectory.

pub mod lifecycle;
pub mod status;

pub use lifecycle::{ConversationController, PollOutcome, RunReport, TrajectoryArtifacts};
pub use status::{status_label, ConversationStatus, ExitClass, ObservedStatus, TerminalStatus};

use crate::sink::Output;

/// A conversation as known right after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub status: ConversationStatus,
    pub url: String,
}

impl Conversation {
    /// Step outputs for a create-only run.
    pub fn outputs(&self) -> Vec<Output> {
        vec![
            ("conversation-id", self.id.clone()),
            ("status", self.status.to_string()),
            ("conversation-url", self.url.clone()),
        ]
    }
}
