//! Convoy CLI binary entry point.

use clap::Parser;
use convoy::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Create(args) => convoy::cli::conversation::handle_create(args).await,
        Commands::Poll(args) => convoy::cli::conversation::handle_poll(args).await,
        Commands::Run(args) => convoy::cli::conversation::handle_run(args).await,
        Commands::Extract(args) => convoy::cli::extract::handle_extract(args),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}
