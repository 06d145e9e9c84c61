//! Conversation controller.
//!
//! `create` → `poll` until a terminal status or the timeout → optionally
//! download the trajectory and extract the last agent message. Only
//! creation failures are returned as errors; everything after creation
//! degrades to warnings and is reflected in the [`RunReport`].

use std::path::PathBuf;

use serde_json::Value;
use tokio::time::{sleep, Instant};

use super::status::{status_label, ConversationStatus, ExitClass, ObservedStatus};
use super::Conversation;
use crate::config::ConvoyConfig;
use crate::error::{ConvoyError, Result};
use crate::sink::{ArtifactStore, Output};
use crate::trajectory::{extract_or_warn, LastAgentMessage};
use crate::transport::{ConversationApi, NewConversation};

/// Keys that may carry the id in a create response, in priority order.
const ID_KEYS: [&str; 2] = ["conversation_id", "id"];

/// Result of the polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Last status observed, or the seed if no fetch succeeded.
    pub last_status: ObservedStatus,
    /// The budget ran out before a terminal status was seen.
    pub timed_out: bool,
    /// Status fetches attempted, failed ones included.
    pub fetches: u32,
}

/// Files written after a terminal status.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryArtifacts {
    pub trajectory_file: PathBuf,
    pub last_message: Option<LastAgentMessage>,
    pub last_message_file: Option<PathBuf>,
}

/// Everything a finished run reports to the automation platform.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub conversation_id: String,
    pub conversation_url: String,
    pub poll: PollOutcome,
    pub artifacts: Option<TrajectoryArtifacts>,
}

impl RunReport {
    pub fn status(&self) -> &ObservedStatus {
        &self.poll.last_status
    }

    pub fn exit_class(&self) -> ExitClass {
        ExitClass::from_status(self.status())
    }

    pub fn outputs(&self) -> Vec<Output> {
        let mut outputs = vec![
            ("conversation-id", self.conversation_id.clone()),
            ("status", status_label(self.status())),
            ("conversation-url", self.conversation_url.clone()),
        ];
        if let Some(artifacts) = &self.artifacts {
            outputs.push((
                "trajectory-file",
                artifacts.trajectory_file.display().to_string(),
            ));
            if let Some(path) = &artifacts.last_message_file {
                outputs.push(("last-message-file", path.display().to_string()));
            }
        }
        outputs
    }
}

/// Drives one conversation through its lifecycle.
pub struct ConversationController<A> {
    api: A,
    config: ConvoyConfig,
    artifacts: ArtifactStore,
}

impl<A: ConversationApi> ConversationController<A> {
    pub fn new(api: A, config: ConvoyConfig) -> Self {
        let artifacts = ArtifactStore::new(config.artifact_dir());
        Self {
            api,
            config,
            artifacts,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &ConvoyConfig {
        &self.config
    }

    /// Create a conversation.
    ///
    /// Transport failures become `CreationFailed`; a response without an id
    /// becomes `UnexpectedResponse` carrying the pretty-printed body.
    pub async fn create(&self, request: &NewConversation) -> Result<Conversation> {
        let created = self
            .api
            .create_conversation(request)
            .await
            .map_err(ConvoyError::creation_failed)?;

        let Some(id) = conversation_id(&created) else {
            let body = serde_json::to_string_pretty(&created).unwrap_or_else(|_| created.to_string());
            return Err(ConvoyError::UnexpectedResponse(body));
        };
        let status = ConversationStatus::from_json(created.get("status"));
        tracing::info!(conversation_id = %id, status = %status, "conversation created");

        Ok(Conversation {
            url: self.config.conversation_url(&id),
            id,
            status,
        })
    }

    /// Poll until a terminal status or until the timeout elapses.
    pub async fn poll(&self, conversation_id: &str) -> PollOutcome {
        self.poll_from(conversation_id, None).await
    }

    /// Poll, reporting `seed` as the last status if no fetch succeeds.
    pub async fn poll_from(&self, conversation_id: &str, seed: ObservedStatus) -> PollOutcome {
        let policy = self.config.poll();
        let start = Instant::now();
        let mut last_status = seed;
        let mut fetches = 0;

        while start.elapsed() < policy.timeout {
            fetches += 1;
            match self.api.get_conversation(conversation_id).await {
                Ok(conversation) => {
                    let status = ConversationStatus::from_json(conversation.get("status"));
                    tracing::info!(
                        elapsed_secs = start.elapsed().as_secs(),
                        status = %status,
                        "polled conversation"
                    );
                    let terminal = status.is_terminal();
                    last_status = Some(status);
                    if terminal {
                        tracing::info!(
                            status = %status_label(&last_status),
                            "conversation completed"
                        );
                        return PollOutcome {
                            last_status,
                            timed_out: false,
                            fetches,
                        };
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "polling error");
                }
            }
            sleep(policy.interval).await;
        }

        tracing::warn!(
            timeout_secs = policy.timeout.as_secs(),
            status = %status_label(&last_status),
            "polling timed out"
        );
        PollOutcome {
            last_status,
            timed_out: true,
            fetches,
        }
    }

    /// Download the trajectory, persist it and the last agent message.
    ///
    /// Failures are logged and yield `None`; they never fail the run.
    pub async fn collect_trajectory(&self, conversation_id: &str) -> Option<TrajectoryArtifacts> {
        tracing::info!(conversation_id, "downloading trajectory");
        let trajectory = match self.api.get_trajectory(conversation_id).await {
            Ok(trajectory) => trajectory,
            Err(e) => {
                tracing::warn!(error = %e, "failed to download trajectory");
                return None;
            }
        };
        match self.save_artifacts(conversation_id, &trajectory) {
            Ok(artifacts) => {
                tracing::info!(
                    path = %artifacts.trajectory_file.display(),
                    "trajectory saved"
                );
                Some(artifacts)
            }
            Err(e) => {
                tracing::warn!(error = %e, "error saving trajectory");
                None
            }
        }
    }

    fn save_artifacts(&self, conversation_id: &str, trajectory: &Value) -> Result<TrajectoryArtifacts> {
        let trajectory_file = self.artifacts.save_trajectory(conversation_id, trajectory)?;
        let last_message = extract_or_warn(trajectory);
        let last_message_file = last_message
            .as_ref()
            .map(|message| self.artifacts.save_last_message(conversation_id, message))
            .transpose()?;
        Ok(TrajectoryArtifacts {
            trajectory_file,
            last_message,
            last_message_file,
        })
    }

    /// Poll an existing conversation and, once terminal, collect its trajectory.
    pub async fn watch(&self, conversation_id: &str, seed: ObservedStatus) -> RunReport {
        let poll = self.poll_from(conversation_id, seed).await;
        let terminal = poll
            .last_status
            .as_ref()
            .is_some_and(ConversationStatus::is_terminal);
        let artifacts = if terminal && self.config.download_trajectory() {
            self.collect_trajectory(conversation_id).await
        } else {
            None
        };
        RunReport {
            conversation_id: conversation_id.to_string(),
            conversation_url: self.config.conversation_url(conversation_id),
            poll,
            artifacts,
        }
    }

    /// Create a conversation and watch it to completion.
    pub async fn run(&self, request: &NewConversation) -> Result<RunReport> {
        let conversation = self.create(request).await?;
        Ok(self.watch(&conversation.id, Some(conversation.status)).await)
    }
}

/// Pull the id out of a create response, trying each accepted key in turn.
fn conversation_id(created: &Value) -> Option<String> {
    ID_KEYS.iter().find_map(|key| match created.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
