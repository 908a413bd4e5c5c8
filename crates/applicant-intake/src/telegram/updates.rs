use serde::Deserialize;

use crate::workflows::intake::{ChatId, DocumentDescriptor, DocumentHandle, InboundEvent};

/// Subset of a Bot API `Update` the intake flow reacts to.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<UpdateMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMessage {
    pub chat: UpdateChat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub document: Option<UpdateDocument>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDocument {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl Update {
    /// Maps the update onto an intake event. Edits, photos, stickers and other update kinds
    /// yield `None`.
    pub fn into_event(self) -> Option<(ChatId, InboundEvent)> {
        let message = self.message?;
        let chat = ChatId(message.chat.id);

        if let Some(document) = message.document {
            let descriptor = DocumentDescriptor {
                mime_type: document.mime_type,
                file_name: document.file_name,
                handle: DocumentHandle(document.file_id),
            };
            return Some((chat, InboundEvent::Document(descriptor)));
        }

        message
            .text
            .map(|text| (chat, InboundEvent::from_text(&text)))
    }
}
