use muni_common::models::auth::Acknowledgement;
use muni_common::models::chat::{
    ChatHistory, ChatMetrics, ChatReply, ChatRequest, ChatSessionSummary, ServiceHealth,
};
use reqwest::Method;

use crate::error::Result;
use crate::session::SessionManager;

const BASE: &str = "/api/chatbot";

/// Reply shown when the assistant backend cannot be reached.
pub const OFFLINE_REPLY: &str = "🤖 El servicio de IA no está disponible en este momento. Por favor, intenta más tarde o contacta al administrador.";
/// Session id used for offline replies when no conversation exists yet.
pub const FALLBACK_SESSION_ID: &str = "fallback-session";

#[derive(Clone)]
pub struct ChatbotApi {
    session: SessionManager,
}

impl ChatbotApi {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    /// Send a message in the remembered conversation, or start a new one.
    ///
    /// The conversation id the server replies with is remembered for the
    /// next call. When the service is down (5xx or unreachable) the reply is
    /// a canned offline message rather than an error, so the chat widget
    /// never blocks. A 401 is still an error.
    #[tracing::instrument(skip(self, message))]
    pub async fn send_message(&self, message: &str, force_new_session: bool) -> Result<ChatReply> {
        let session_id = if force_new_session {
            None
        } else {
            self.session.chat_session_id()
        };
        let req = ChatRequest {
            message: message.to_string(),
            session_id: session_id.clone(),
            force_new_session,
        };

        let result: Result<ChatReply> = self
            .session
            .send_json(
                self.session
                    .request(Method::POST, &format!("{}/chat", BASE))
                    .json(&req),
            )
            .await;

        match result {
            Ok(reply) => {
                if session_id.as_deref() != Some(reply.session_id.as_str()) {
                    if let Err(e) = self.session.remember_chat_session(&reply.session_id) {
                        tracing::warn!("Failed to remember chat session: {}", e);
                    }
                }
                Ok(reply)
            }
            Err(e) if e.is_network_failure() => {
                tracing::warn!("Chatbot unavailable, replying offline: {}", e);
                Ok(ChatReply {
                    response: OFFLINE_REPLY.to_string(),
                    session_id: session_id.unwrap_or_else(|| FALLBACK_SESSION_ID.to_string()),
                    tokens_used: None,
                    response_time_ms: None,
                    error: Some(e.to_string()),
                })
            }
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn history(&self, session_id: &str) -> Result<ChatHistory> {
        self.session
            .send_json(
                self.session
                    .request_segments(Method::GET, &["api", "chatbot", "chat", "history", session_id]),
            )
            .await
    }

    /// Delete a conversation; forgets it locally if it was the current one
    #[tracing::instrument(skip(self))]
    pub async fn delete_session(&self, session_id: &str) -> Result<Acknowledgement> {
        let ack = self
            .session
            .send_json(
                self.session
                    .request_segments(Method::DELETE, &["api", "chatbot", "chat", "session", session_id]),
            )
            .await?;
        if self.session.chat_session_id().as_deref() == Some(session_id) {
            self.session.forget_chat_session()?;
        }
        Ok(ack)
    }

    #[tracing::instrument(skip(self))]
    pub async fn metrics(&self) -> Result<ChatMetrics> {
        self.session.get_json(&format!("{}/chat/metrics", BASE)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn sessions(&self) -> Result<Vec<ChatSessionSummary>> {
        self.session.get_json(&format!("{}/chat/sessions", BASE)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn health(&self) -> Result<ServiceHealth> {
        self.session.get_json(&format!("{}/health", BASE)).await
    }
}
