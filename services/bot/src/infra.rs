use applicant_intake::workflows::intake::{ChatId, ChatTransport, DocumentHandle, TransportError};
use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Transport that prints outbound traffic instead of calling the chat platform.
pub(crate) struct ConsoleTransport {
    reviewer: ChatId,
    forwarded: Mutex<usize>,
}

impl ConsoleTransport {
    pub(crate) fn new(reviewer: ChatId) -> Self {
        Self {
            reviewer,
            forwarded: Mutex::new(0),
        }
    }

    /// Number of messages and documents delivered to the reviewer chat so far.
    pub(crate) fn forwarded(&self) -> usize {
        *self.forwarded.lock().expect("console mutex poisoned")
    }

    fn label(&self, chat: ChatId) -> String {
        if chat == self.reviewer {
            let mut guard = self.forwarded.lock().expect("console mutex poisoned");
            *guard += 1;
            format!("reviewer {chat}")
        } else {
            format!("applicant {chat}")
        }
    }
}

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError> {
        let label = self.label(chat);
        for (index, line) in text.lines().enumerate() {
            if index == 0 {
                println!("  [{label}] {line}");
            } else {
                println!("  {:width$}  {line}", "", width = label.len() + 1);
            }
        }
        Ok(())
    }

    async fn send_document(
        &self,
        chat: ChatId,
        handle: &DocumentHandle,
    ) -> Result<(), TransportError> {
        let label = self.label(chat);
        println!("  [{label}] <document {}>", handle.0);
        Ok(())
    }
}
