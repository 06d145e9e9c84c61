//! Convenience re-exports for common use.

pub use crate::config::{ConvoyConfig, PollPolicy, PromptSource};
pub use crate::conversation::{
    Conversation, ConversationController, ConversationStatus, ExitClass, RunReport,
    TerminalStatus,
};
pub use crate::error::{ConvoyError, Result};
pub use crate::sink::{ArtifactStore, GithubOutputSink, ResultSink};
pub use crate::trajectory::{extract_last_agent_message, last_agent_message, Event, LastAgentMessage};
pub use crate::transport::{ConversationApi, HttpConversationApi, NewConversation};
