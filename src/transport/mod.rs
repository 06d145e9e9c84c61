//! Remote conversation service API.

pub mod http;

pub use http::HttpConversationApi;

use async_trait::async_trait;
use bon::Builder;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Body of the conversation creation request.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize)]
pub struct NewConversation {
    #[builder(into)]
    pub initial_user_msg: String,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_branch: Option<String>,
}

/// Calls the controller makes against the conversation service.
///
/// Responses are handed back as raw JSON: the controller decides which
/// fields matter, and the trajectory is persisted exactly as received.
#[async_trait]
pub trait ConversationApi: Send + Sync {
    /// `POST /api/conversations`
    async fn create_conversation(&self, request: &NewConversation) -> Result<Value>;

    /// `GET /api/conversations/{id}`
    async fn get_conversation(&self, conversation_id: &str) -> Result<Value>;

    /// `GET /api/conversations/{id}/trajectory`
    async fn get_trajectory(&self, conversation_id: &str) -> Result<Value>;
}
