//! reqwest-backed conversation service client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;
use serde_json::Value;

use super::{ConversationApi, NewConversation};
use crate::config::{join_segments, ConvoyConfig};
use crate::error::{ConvoyError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
        ConvoyError::Configuration("API key contains characters not allowed in a header".into())
    })?;
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}

/// Authenticated client for the conversation service.
#[derive(Debug, Clone)]
pub struct HttpConversationApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpConversationApi {
    pub fn new(config: &ConvoyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(bearer_headers(config.api_key())?)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base().clone(),
        })
    }

    /// `{base}/api/conversations/{segments...}` with each segment escaped.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let path: Vec<&str> = ["api", "conversations"].iter().chain(segments).copied().collect();
        join_segments(&self.base_url, &path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ConvoyError::api(status.as_u16(), body));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ConversationApi for HttpConversationApi {
    async fn create_conversation(&self, request: &NewConversation) -> Result<Value> {
        tracing::debug!(
            repository = request.repository.as_deref().unwrap_or(""),
            branch = request.selected_branch.as_deref().unwrap_or(""),
            "creating conversation"
        );
        self.send(self.client.post(self.endpoint(&[])).json(request)).await
    }

    async fn get_conversation(&self, conversation_id: &str) -> Result<Value> {
        self.send(self.client.get(self.endpoint(&[conversation_id]))).await
    }

    async fn get_trajectory(&self, conversation_id: &str) -> Result<Value> {
        let url = self.endpoint(&[conversation_id, "trajectory"]);
        self.send(self.client.get(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_headers_carry_token_and_json_content_type() {
        let headers = bearer_headers("sk-test").unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer sk-test");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn header_unsafe_key_is_rejected() {
        let err = bearer_headers("bad\nkey").unwrap_err();
        assert!(matches!(err, ConvoyError::Configuration(_)));
    }

    #[test]
    fn endpoints_hang_off_the_api_prefix() {
        let config = ConvoyConfig::new("k")
            .unwrap()
            .with_base_url("http://localhost:3000/")
            .unwrap();
        let api = HttpConversationApi::new(&config).unwrap();
        assert_eq!(api.endpoint(&[]).as_str(), "http://localhost:3000/api/conversations");
        assert_eq!(
            api.endpoint(&["abc", "trajectory"]).as_str(),
            "http://localhost:3000/api/conversations/abc/trajectory"
        );
    }

    #[test]
    fn conversation_id_cannot_escape_its_segment() {
        let config = ConvoyConfig::new("k")
            .unwrap()
            .with_base_url("http://localhost:3000")
            .unwrap();
        let api = HttpConversationApi::new(&config).unwrap();
        assert_eq!(
            api.endpoint(&["../admin?x=1", "trajectory"]).as_str(),
            "http://localhost:3000/api/conversations/..%2Fadmin%3Fx=1/trajectory"
        );
    }
}
