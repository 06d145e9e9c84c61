//! CLI handler for `convoy extract`.

use std::path::Path;

use serde_json::Value;

use crate::error::{ConvoyError, Result};
use crate::sink::artifacts::write_json;
use crate::sink::{GithubOutputSink, Output, ResultSink};
use crate::trajectory::{extract_or_warn, LastAgentMessage};

use super::{ExtractArgs, OutputFormat};

/// Handle `convoy extract`.
pub fn handle_extract(args: ExtractArgs) -> Result<i32> {
    let github = args.is_github_action();
    let format = args.effective_format();

    let trajectory = load_trajectory(&args.trajectory_file)?;
    let message = extract_or_warn(&trajectory).ok_or(ConvoyError::NoAgentMessage)?;

    let mut message_file = None;
    match format {
        OutputFormat::MessageOnly => println!("{}", message_text(&message)),
        OutputFormat::Json | OutputFormat::Pretty => {
            let pretty = format == OutputFormat::Pretty;
            if let Some(output) = &args.output {
                let path = write_json(output, &message, pretty)?;
                if !github {
                    println!("Last agent message saved to: {}", path.display());
                }
                message_file = Some(path);
            } else if !github {
                let rendered = if pretty {
                    serde_json::to_string_pretty(&message)?
                } else {
                    serde_json::to_string(&message)?
                };
                println!("{rendered}");
            }
        }
    }

    if github {
        let mut outputs: Vec<Output> = Vec::new();
        if let Some(path) = &message_file {
            outputs.push(("message-file", path.display().to_string()));
        }
        outputs.extend(message_outputs(&message));
        GithubOutputSink::from_env().write_outputs(&outputs)?;
    }

    if !github || format != OutputFormat::MessageOnly {
        eprintln!("Action: {}", message.action);
        if let Some(timestamp) = message.timestamp_label() {
            eprintln!("Timestamp: {timestamp}");
        }
        if !message.message.is_empty() {
            eprintln!("Message length: {} characters", message.message.chars().count());
        }
    }
    Ok(0)
}

/// Read and parse a trajectory file.
pub fn load_trajectory(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(ConvoyError::TrajectoryNotFound(path.to_path_buf()));
    }
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| {
        ConvoyError::MalformedTrajectory(format!("invalid JSON in {}: {e}", path.display()))
    })
}

/// Message text, or a placeholder naming the action when the text is empty.
pub fn message_text(message: &LastAgentMessage) -> String {
    if message.message.is_empty() {
        format!("[{} action with no message]", message.action)
    } else {
        message.message.clone()
    }
}

fn message_outputs(message: &LastAgentMessage) -> Vec<Output> {
    vec![
        ("action", message.action.clone()),
        ("message", message.message.clone()),
        ("timestamp", message.timestamp_label().unwrap_or_default()),
    ]
}
