//! Convoy: drive remote agent conversations from CI.
//!
//! Creates a conversation on the conversation service, polls it until it
//! reaches a terminal status or the polling budget runs out, then downloads
//! the trajectory and extracts the last agent message.
//!
//! # Quick Start
//!
//! ```no_run
//! use convoy::prelude::*;
//!
//! # async fn example() -> convoy::error::Result<()> {
//! let config = ConvoyConfig::from_env()?;
//! let api = HttpConversationApi::new(&config)?;
//! let controller = ConversationController::new(api, config);
//!
//! let request = NewConversation::builder()
//!     .initial_user_msg("Fix the failing tests")
//!     .repository("acme/widgets")
//!     .build();
//! let report = controller.run(&request).await?;
//! std::process::exit(report.exit_class().exit_code());
//! # }
//! ```

pub mod config;
pub mod conversation;
pub mod error;
pub mod prelude;
pub mod sink;
pub mod trajectory;
pub mod transport;

#[cfg(feature = "cli")]
pub mod cli;
