//! Client for the retrieval-augmented chat assistant.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::detector::ensure_success;
use crate::error::ServiceError;

/// Which assistant behaviour to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Summarize the user's plan.
    Overview,
    /// Free-form question answering.
    Chat,
}

impl ChatMode {
    pub fn path(self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::Chat => "chat",
        }
    }
}

/// Text in, text out.
#[async_trait]
pub trait ChatAssistant: Send + Sync {
    async fn respond(
        &self,
        mode: ChatMode,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<String, ServiceError>;
}

#[derive(Serialize)]
struct ChatBody<'a> {
    message: &'a str,
    session_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct ChatReply {
    response: String,
}

/// HTTP client posting to `{base}/overview` or `{base}/chat`.
pub struct HttpAssistant {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAssistant {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ChatAssistant for HttpAssistant {
    async fn respond(
        &self,
        mode: ChatMode,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, mode.path()))
            .json(&ChatBody { message, session_id })
            .send()
            .await?;
        let reply: ChatReply = ensure_success(response).await?.json().await?;
        Ok(reply.response)
    }
}
