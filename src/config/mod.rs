//! Run configuration: credentials, endpoints, polling policy, prompt source.

pub mod prompt;

pub use prompt::PromptSource;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;

use crate::error::{ConvoyError, Result};

/// Default service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://app.all-hands.dev";

/// Environment variable holding the bearer credential.
pub const API_KEY_ENV: &str = "OPENHANDS_API_KEY";

/// How long to wait for a conversation and how often to ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total wall-clock budget for the polling loop.
    pub timeout: Duration,
    /// Sleep between status fetches.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1200),
            interval: Duration::from_secs(30),
        }
    }
}

impl PollPolicy {
    pub fn from_secs(timeout: u64, interval: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout),
            interval: Duration::from_secs(interval),
        }
    }
}

/// Immutable configuration handed to the conversation controller.
#[derive(Clone)]
pub struct ConvoyConfig {
    api_key: String,
    base_url: Url,
    poll: PollPolicy,
    download_trajectory: bool,
    artifact_dir: PathBuf,
}

impl fmt::Debug for ConvoyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvoyConfig")
            .field("api_key", &"..")
            .field("base_url", &self.base_url())
            .field("poll", &self.poll)
            .field("download_trajectory", &self.download_trajectory)
            .field("artifact_dir", &self.artifact_dir)
            .finish()
    }
}

impl ConvoyConfig {
    /// Create a config with defaults for everything but the credential.
    ///
    /// A blank key is rejected before any network call is made.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = non_blank(Some(api_key.into()))
            .ok_or_else(|| ConvoyError::Configuration(format!("{API_KEY_ENV} is required")))?;
        Ok(Self {
            api_key,
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            poll: PollPolicy::default(),
            download_trajectory: true,
            artifact_dir: PathBuf::from("."),
        })
    }

    /// Load the credential from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::new(std::env::var(API_KEY_ENV).unwrap_or_default())
    }

    /// Point at another service. A blank value keeps the default.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.base_url = parse_base_url(trimmed)?;
        }
        Ok(self)
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_download_trajectory(mut self, enabled: bool) -> Self {
        self.download_trajectory = enabled;
        self
    }

    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn base(&self) -> &Url {
        &self.base_url
    }

    pub fn poll(&self) -> PollPolicy {
        self.poll
    }

    pub fn download_trajectory(&self) -> bool {
        self.download_trajectory
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    /// Web URL a human can open to follow the conversation.
    pub fn conversation_url(&self, conversation_id: &str) -> String {
        join_segments(&self.base_url, &["conversations", conversation_id]).to_string()
    }
}

fn parse_base_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)
        .map_err(|e| ConvoyError::Configuration(format!("invalid base URL `{url}`: {e}")))?;
    if parsed.cannot_be_a_base() {
        return Err(ConvoyError::Configuration(format!(
            "base URL `{url}` cannot carry a path"
        )));
    }
    Ok(parsed)
}

/// Append path segments to `base`, percent-encoding each one.
pub fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Trim a value and treat whitespace-only input as absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
