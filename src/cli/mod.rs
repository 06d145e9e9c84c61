//! CLI entry point for Convoy.
//!
//! Every flag also reads the environment variable a GitHub Actions step
//! would set (`INPUT_*`), so the binary runs unchanged as an action step.

pub mod conversation;
pub mod extract;

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::{non_blank, ConvoyConfig, PollPolicy, PromptSource, API_KEY_ENV, DEFAULT_BASE_URL};
use crate::error::{ConvoyError, Result};
use crate::transport::NewConversation;

/// Convoy CLI
#[derive(Parser, Debug)]
#[command(name = "convoy", version, about = "Run remote agent conversations from CI")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a conversation and exit
    Create(CreateArgs),
    /// Wait for an existing conversation and download its trajectory
    Poll(PollArgs),
    /// Create a conversation and wait for it to finish
    Run(RunArgs),
    /// Extract the last agent message from a trajectory file
    Extract(ExtractArgs),
}

/// Service endpoint and credential.
#[derive(Args, Debug, Clone)]
pub struct ServiceArgs {
    /// Bearer credential for the conversation service
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Service base URL
    #[arg(long, env = "INPUT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

impl ServiceArgs {
    pub fn config(&self) -> Result<ConvoyConfig> {
        ConvoyConfig::new(self.api_key.clone().unwrap_or_default())?
            .with_base_url(self.base_url.as_str())
    }
}

/// What to ask the agent, and where.
#[derive(Args, Debug, Clone)]
pub struct PromptArgs {
    /// Prompt text, or a path to a file containing it
    #[arg(long, env = "INPUT_PROMPT")]
    pub prompt: Option<String>,

    /// Repository the agent works on (defaults to GITHUB_REPOSITORY)
    #[arg(long, env = "INPUT_REPOSITORY")]
    pub repository: Option<String>,

    #[arg(long, env = "GITHUB_REPOSITORY", hide = true)]
    pub current_repository: Option<String>,

    /// Branch to check out
    #[arg(long = "branch", env = "INPUT_SELECTED_BRANCH")]
    pub selected_branch: Option<String>,
}

impl PromptArgs {
    /// Resolve the prompt source and build the creation request.
    pub fn request(&self) -> Result<NewConversation> {
        let input = non_blank(self.prompt.clone())
            .ok_or_else(|| ConvoyError::Configuration("prompt is required".into()))?;
        let initial_user_msg = PromptSource::from_input(&input).resolve()?;
        let repository =
            non_blank(self.repository.clone()).or_else(|| non_blank(self.current_repository.clone()));
        Ok(NewConversation::builder()
            .initial_user_msg(initial_user_msg)
            .maybe_repository(repository)
            .maybe_selected_branch(non_blank(self.selected_branch.clone()))
            .build())
    }
}

/// Polling budget and post-completion downloads.
#[derive(Args, Debug, Clone)]
pub struct PollingArgs {
    /// Total polling budget in seconds
    #[arg(long, env = "INPUT_TIMEOUT", default_value_t = 1200)]
    pub timeout: u64,

    /// Seconds between status checks
    #[arg(long, env = "INPUT_INTERVAL", default_value_t = 30)]
    pub interval: u64,

    /// Download the trajectory once the conversation finishes
    #[arg(
        long,
        env = "INPUT_DOWNLOAD_TRAJECTORY",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub download_trajectory: bool,

    /// Directory for trajectory and last-message files
    #[arg(long, env = "INPUT_ARTIFACT_DIR", default_value = ".")]
    pub artifact_dir: PathBuf,
}

impl PollingArgs {
    pub fn apply(&self, config: ConvoyConfig) -> ConvoyConfig {
        config
            .with_poll_policy(PollPolicy::from_secs(self.timeout, self.interval))
            .with_download_trajectory(self.download_trajectory)
            .with_artifact_dir(self.artifact_dir.clone())
    }
}

/// Arguments for `convoy create`.
#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub service: ServiceArgs,
    #[command(flatten)]
    pub prompt: PromptArgs,
}

/// Arguments for `convoy poll`.
#[derive(Args, Debug)]
pub struct PollArgs {
    #[command(flatten)]
    pub service: ServiceArgs,

    /// Conversation to wait for
    #[arg(long, env = "INPUT_CONVERSATION_ID")]
    pub conversation_id: Option<String>,

    #[command(flatten)]
    pub polling: PollingArgs,
}

/// Arguments for `convoy run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub service: ServiceArgs,
    #[command(flatten)]
    pub prompt: PromptArgs,
    #[command(flatten)]
    pub polling: PollingArgs,

    /// Wait for the conversation to finish (false behaves like `create`)
    #[arg(
        long,
        env = "INPUT_POLL",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub poll: bool,
}

/// How `convoy extract` prints the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
    /// Only the message text
    MessageOnly,
}

/// Arguments for `convoy extract`.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Trajectory JSON file
    #[arg(env = "INPUT_TRAJECTORY_FILE")]
    pub trajectory_file: PathBuf,

    /// Write the extracted message to this file instead of stdout
    #[arg(short, long, env = "INPUT_OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    #[arg(long, env = "INPUT_FORMAT", value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Only print the message content (same as --format message-only)
    #[arg(long, conflicts_with = "pretty")]
    pub print_only: bool,

    /// Pretty print JSON output (same as --format pretty)
    #[arg(long)]
    pub pretty: bool,

    #[arg(long, env = "GITHUB_ACTIONS", hide = true)]
    pub github_actions: Option<String>,
}

impl ExtractArgs {
    pub fn effective_format(&self) -> OutputFormat {
        if self.print_only {
            OutputFormat::MessageOnly
        } else if self.pretty {
            OutputFormat::Pretty
        } else {
            self.format
        }
    }

    pub fn is_github_action(&self) -> bool {
        non_blank(self.github_actions.clone()).is_some()
    }
}
