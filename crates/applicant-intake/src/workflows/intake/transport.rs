use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::{ChatId, DocumentDescriptor, DocumentHandle};

/// Step shortcuts the applicant can issue at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntakeCommand {
    CoverLetter,
    Cv,
}

/// Inbound event delivered by the chat transport for a single chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundEvent {
    Start,
    Text(String),
    Command(IntakeCommand),
    Document(DocumentDescriptor),
}

impl InboundEvent {
    /// Classifies a raw text message. Recognized commands may carry a `@botname` suffix;
    /// anything else, unknown commands included, is plain text.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return InboundEvent::Text(text.to_string());
        };

        let word = rest.split_whitespace().next().unwrap_or_default();
        let name = word.split('@').next().unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "start" => InboundEvent::Start,
            "coverletter" => InboundEvent::Command(IntakeCommand::CoverLetter),
            "cv" => InboundEvent::Command(IntakeCommand::Cv),
            _ => InboundEvent::Text(text.to_string()),
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Start => "start",
            InboundEvent::Text(_) => "text",
            InboundEvent::Command(IntakeCommand::CoverLetter) => "coverletter",
            InboundEvent::Command(IntakeCommand::Cv) => "cv",
            InboundEvent::Document(_) => "document",
        }
    }
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError>;
    async fn send_document(
        &self,
        chat: ChatId,
        handle: &DocumentHandle,
    ) -> Result<(), TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("transport rejected call ({code:?}): {description}")]
    Api {
        code: Option<i64>,
        description: String,
    },
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}
