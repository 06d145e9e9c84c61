//! Shared test helpers and a scripted conversation service.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use convoy::config::{ConvoyConfig, PollPolicy};
use convoy::error::{ConvoyError, Result};
use convoy::transport::{ConversationApi, NewConversation};

/// A canned service reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Http(u16),
}

impl Reply {
    pub fn status(status: &str) -> Self {
        Self::Json(json!({ "conversation_id": "conv-1", "status": status }))
    }

    fn into_result(self) -> Result<Value> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Http(status) => Err(ConvoyError::api(status, "scripted failure")),
        }
    }
}

/// In-memory service that replays scripted replies.
///
/// Status replies are consumed in order; the last one repeats forever.
pub struct ScriptedApi {
    create_reply: Reply,
    status_replies: Mutex<VecDeque<Reply>>,
    last_status: Mutex<Reply>,
    trajectory_reply: Reply,
    created: Mutex<Vec<NewConversation>>,
    status_calls: AtomicU32,
    trajectory_calls: AtomicU32,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self {
            create_reply: Reply::Json(json!({ "conversation_id": "conv-1", "status": "STARTING" })),
            status_replies: Mutex::new(VecDeque::new()),
            last_status: Mutex::new(Reply::status("RUNNING")),
            trajectory_reply: Reply::Json(json!({ "events": [] })),
            created: Mutex::new(Vec::new()),
            status_calls: AtomicU32::new(0),
            trajectory_calls: AtomicU32::new(0),
        }
    }

    pub fn on_create(mut self, reply: Reply) -> Self {
        self.create_reply = reply;
        self
    }

    pub fn on_status(self, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.status_replies.lock().unwrap().extend(replies);
        self
    }

    pub fn on_trajectory(mut self, reply: Reply) -> Self {
        self.trajectory_reply = reply;
        self
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn trajectory_calls(&self) -> u32 {
        self.trajectory_calls.load(Ordering::SeqCst)
    }

    pub fn created(&self) -> Vec<NewConversation> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationApi for ScriptedApi {
    async fn create_conversation(&self, request: &NewConversation) -> Result<Value> {
        self.created.lock().unwrap().push(request.clone());
        self.create_reply.clone().into_result()
    }

    async fn get_conversation(&self, _conversation_id: &str) -> Result<Value> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.status_replies.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last_status.lock().unwrap() = reply.clone();
                reply
            }
            None => self.last_status.lock().unwrap().clone(),
        };
        reply.into_result()
    }

    async fn get_trajectory(&self, _conversation_id: &str) -> Result<Value> {
        self.trajectory_calls.fetch_add(1, Ordering::SeqCst);
        self.trajectory_reply.clone().into_result()
    }
}

/// Config pointing at `dir` for artifacts, with the given polling budget.
pub fn test_config(dir: &Path, timeout_secs: u64, interval_secs: u64) -> ConvoyConfig {
    ConvoyConfig::new("test-key")
        .unwrap()
        .with_base_url("https://agents.example.test")
        .unwrap()
        .with_poll_policy(PollPolicy::from_secs(timeout_secs, interval_secs))
        .with_artifact_dir(dir)
}

pub fn sample_trajectory() -> Value {
    json!({
        "events": [
            { "source": "user", "action": "message", "message": "Fix the build" },
            { "source": "agent", "action": "run", "args": { "command": "cargo test" } },
            { "source": "agent", "action": "message", "message": "Hello" },
            { "source": "agent", "action": "finish", "message": "Done", "timestamp": "2024-05-01T12:00:00" }
        ]
    })
}
