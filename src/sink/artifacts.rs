//! Trajectory and last-message files named after the conversation id.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::trajectory::LastAgentMessage;

/// Writes run artifacts into a directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn trajectory_path(&self, conversation_id: &str) -> PathBuf {
        self.dir.join(format!("trajectory_{conversation_id}.json"))
    }

    pub fn last_message_path(&self, conversation_id: &str) -> PathBuf {
        self.dir
            .join(format!("last_agent_message_{conversation_id}.json"))
    }

    /// Persist the raw trajectory exactly as received. Returns the absolute path.
    pub fn save_trajectory(&self, conversation_id: &str, trajectory: &Value) -> Result<PathBuf> {
        write_json(&self.trajectory_path(conversation_id), trajectory, true)
    }

    pub fn save_last_message(
        &self,
        conversation_id: &str,
        message: &LastAgentMessage,
    ) -> Result<PathBuf> {
        write_json(&self.last_message_path(conversation_id), message, true)
    }
}

/// Serialize `value` to `path` and return the absolute path written.
///
/// Non-ASCII text is written as-is.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<PathBuf> {
    let body = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)?;
    Ok(std::fs::canonicalize(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn files_are_named_after_the_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let trajectory = json!({ "events": [ { "source": "agent", "message": "héllo" } ] });
        let path = store.save_trajectory("abc123", &trajectory).unwrap();

        assert!(path.is_absolute());
        assert!(path.ends_with("trajectory_abc123.json"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("héllo"));
        assert!(written.contains("\n  \"events\""));
        let reread: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(reread, trajectory);
    }

    #[test]
    fn last_message_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nested"));
        let message = LastAgentMessage {
            action: "finish".into(),
            message: "Done".into(),
            timestamp: None,
            args: Map::new(),
            extras: Map::new(),
        };

        let path = store.save_last_message("abc123", &message).unwrap();

        assert!(path.ends_with("last_agent_message_abc123.json"));
        let reread: LastAgentMessage =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(reread, message);
    }
}
