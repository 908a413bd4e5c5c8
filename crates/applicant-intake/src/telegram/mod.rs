//! Telegram Bot API adapter: long polling for inbound updates and the outbound
//! `ChatTransport` calls.

pub mod client;
pub mod updates;

pub use client::TelegramClient;
pub use updates::{Update, UpdateChat, UpdateDocument, UpdateMessage};
