//! Step outputs and artifact files for the automation platform.

pub mod artifacts;

pub use artifacts::ArtifactStore;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::Result;

/// Environment variable naming the step-output file.
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// A named step output.
pub type Output = (&'static str, String);

/// Receives the flat name/value outputs of a run.
pub trait ResultSink {
    fn write_outputs(&self, outputs: &[Output]) -> Result<()>;
}

/// Appends outputs to the GitHub Actions output file.
#[derive(Debug, Clone, Default)]
pub struct GithubOutputSink {
    path: Option<PathBuf>,
}

impl GithubOutputSink {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Use the file named by `GITHUB_OUTPUT`, if any.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os(GITHUB_OUTPUT_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        )
    }
}

impl ResultSink for GithubOutputSink {
    fn write_outputs(&self, outputs: &[Output]) -> Result<()> {
        let Some(path) = &self.path else {
            for (name, value) in outputs {
                tracing::debug!(output = *name, value = value.as_str(), "step output");
            }
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut buf = String::new();
        for (name, value) in outputs {
            buf.push_str(&format_output(name, value));
        }
        file.write_all(buf.as_bytes())?;
        Ok(())
    }
}

/// Render one output line; multi-line values use the heredoc form.
fn format_output(name: &str, value: &str) -> String {
    if value.contains('\n') || value.contains('\r') {
        let delimiter = format!("convoy_{}", uuid::Uuid::new_v4().simple());
        format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
    } else {
        format!("{name}={value}\n")
    }
}

/// Collects outputs in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    outputs: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outputs(&self) -> Vec<(String, String)> {
        self.outputs
            .lock()
            .map(|o| o.clone())
            .unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.outputs()
            .into_iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl ResultSink for MemorySink {
    fn write_outputs(&self, outputs: &[Output]) -> Result<()> {
        if let Ok(mut stored) = self.outputs.lock() {
            stored.extend(outputs.iter().map(|(n, v)| (n.to_string(), v.clone())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_values_use_key_value_form() {
        assert_eq!(format_output("status", "STOPPED"), "status=STOPPED\n");
    }

    #[test]
    fn multi_line_values_use_heredoc_form() {
        let rendered = format_output("message", "line one\nline two");
        let mut lines = rendered.lines();
        let header = lines.next().unwrap();
        let delimiter = header.strip_prefix("message<<").unwrap();
        assert_eq!(lines.next(), Some("line one"));
        assert_eq!(lines.next(), Some("line two"));
        assert_eq!(lines.next(), Some(delimiter));
    }

    #[test]
    fn github_sink_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output");
        std::fs::write(&path, "existing=1\n").unwrap();

        let sink = GithubOutputSink::new(Some(path.clone()));
        sink.write_outputs(&[
            ("conversation-id", "abc".to_string()),
            ("status", "RUNNING".to_string()),
        ])
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "existing=1\nconversation-id=abc\nstatus=RUNNING\n"
        );
    }

    #[test]
    fn github_sink_without_file_is_a_no_op() {
        let sink = GithubOutputSink::new(None);
        assert!(sink.write_outputs(&[("status", "STOPPED".into())]).is_ok());
    }

    #[test]
    fn memory_sink_returns_latest_value() {
        let sink = MemorySink::new();
        sink.write_outputs(&[("status", "RUNNING".into())]).unwrap();
        sink.write_outputs(&[("status", "STOPPED".into())]).unwrap();
        assert_eq!(sink.get("status").as_deref(), Some("STOPPED"));
        assert_eq!(sink.outputs().len(), 2);
    }
}
