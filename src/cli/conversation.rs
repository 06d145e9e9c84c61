//! CLI handlers for `create`, `poll` and `run`.

use std::time::Duration;

use crate::config::non_blank;
use crate::conversation::{status_label, Conversation, ConversationController, ExitClass, RunReport};
use crate::error::{ConvoyError, Result};
use crate::sink::{GithubOutputSink, Output, ResultSink};
use crate::transport::HttpConversationApi;

use super::{CreateArgs, PollArgs, RunArgs};

const RULE: &str = "============================================================";
const PREVIEW_CHARS: usize = 100;

/// Handle `convoy create`.
pub async fn handle_create(args: CreateArgs) -> Result<i32> {
    let config = args.service.config()?;
    let request = args.prompt.request()?;
    let controller = ConversationController::new(HttpConversationApi::new(&config)?, config);

    let conversation = controller.create(&request).await?;
    print_created(&conversation);
    publish(&GithubOutputSink::from_env(), &conversation.outputs());
    Ok(0)
}

/// Handle `convoy poll`.
pub async fn handle_poll(args: PollArgs) -> Result<i32> {
    let config = args.polling.apply(args.service.config()?);
    let conversation_id = non_blank(args.conversation_id)
        .ok_or_else(|| ConvoyError::Configuration("conversation id is required".into()))?;
    let controller = ConversationController::new(HttpConversationApi::new(&config)?, config);

    println!("Polling conversation: {conversation_id}");
    println!(
        "🔗 View conversation: {}",
        controller.config().conversation_url(&conversation_id)
    );
    println!("{RULE}");

    let report = controller.watch(&conversation_id, None).await;
    let timeout = controller.config().poll().timeout;
    Ok(finish(&report, timeout, &GithubOutputSink::from_env()))
}

/// Handle `convoy run`.
pub async fn handle_run(args: RunArgs) -> Result<i32> {
    let config = args.polling.apply(args.service.config()?);
    let request = args.prompt.request()?;
    let controller = ConversationController::new(HttpConversationApi::new(&config)?, config);

    let conversation = controller.create(&request).await?;
    print_created(&conversation);
    let sink = GithubOutputSink::from_env();
    if !args.poll {
        publish(&sink, &conversation.outputs());
        return Ok(0);
    }

    let report = controller
        .watch(&conversation.id, Some(conversation.status))
        .await;
    Ok(finish(&report, controller.config().poll().timeout, &sink))
}

fn print_created(conversation: &Conversation) {
    println!(
        "Conversation created: {} (status={})",
        conversation.id, conversation.status
    );
    println!("{RULE}");
    println!("🔗 View conversation: {}", conversation.url);
    println!("{RULE}");
    println!("💡 You can comment this URL in a PR for easy access:");
    println!("   {}", conversation.url);
    println!("{RULE}");
}

/// Print the run summary, publish outputs, and pick the exit code.
fn finish(report: &RunReport, timeout: Duration, sink: &dyn ResultSink) -> i32 {
    if let Some(artifacts) = &report.artifacts {
        println!("📁 Trajectory saved to: {}", artifacts.trajectory_file.display());
        if let (Some(message), Some(path)) = (&artifacts.last_message, &artifacts.last_message_file) {
            println!("💬 Last agent message saved to: {}", path.display());
            println!("📝 Action: {}", message.action);
            if !message.message.is_empty() {
                println!("📄 Message preview: {}", message.preview(PREVIEW_CHARS));
            }
        }
    }
    if report.poll.timed_out {
        println!("Polling timed out after {} seconds", timeout.as_secs());
    }

    publish(sink, &report.outputs());

    let status = status_label(report.status());
    let class = report.exit_class();
    match class {
        ExitClass::Failure => println!("❌ Conversation ended with error status: {status}"),
        ExitClass::Success => println!("✅ Conversation completed successfully"),
        ExitClass::Indeterminate => {
            tracing::warn!(status = %status, "conversation did not reach a terminal status");
            println!("⚠️  Conversation status: {status}");
        }
    }
    class.exit_code()
}

/// Write step outputs; a failing sink is only a warning.
fn publish(sink: &dyn ResultSink, outputs: &[Output]) {
    if let Err(e) = sink.write_outputs(outputs) {
        tracing::warn!(error = %e, "failed to write step outputs");
    }
}
