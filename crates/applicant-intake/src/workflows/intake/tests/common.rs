use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::config::{DeliveryConfig, IntakeConfig};
use crate::workflows::intake::domain::{ChatId, DocumentDescriptor, DocumentHandle, Session};
use crate::workflows::intake::machine::{DocumentRouting, IntakeMachine};
use crate::workflows::intake::store::InMemorySessionStore;
use crate::workflows::intake::transport::{ChatTransport, InboundEvent, TransportError};
use crate::workflows::intake::IntakeService;

pub(super) const APPLICANT: ChatId = ChatId(1001);
pub(super) const REVIEWER: ChatId = ChatId(-42);

pub(super) const PROFILE_ANSWERS: [&str; 6] = [
    "Jane Doe",
    "Engineer",
    "1990-05-21",
    "Female",
    "Berlin",
    "+491701234567",
];

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn text(value: &str) -> InboundEvent {
    InboundEvent::Text(value.to_string())
}

pub(super) fn pdf(file_name: &str, handle: &str) -> InboundEvent {
    InboundEvent::Document(DocumentDescriptor {
        mime_type: Some("application/pdf".to_string()),
        file_name: Some(file_name.to_string()),
        handle: DocumentHandle(handle.to_string()),
    })
}

pub(super) fn document(mime_type: &str, file_name: &str, handle: &str) -> InboundEvent {
    InboundEvent::Document(DocumentDescriptor {
        mime_type: Some(mime_type.to_string()),
        file_name: Some(file_name.to_string()),
        handle: DocumentHandle(handle.to_string()),
    })
}

/// Drives a session through the six profile answers with the default machine.
pub(super) fn session_awaiting_cover_letter(machine: &IntakeMachine) -> Session {
    let mut session = None;
    for answer in PROFILE_ANSWERS {
        session = machine.apply(APPLICANT, session, text(answer), now()).session;
    }
    session.expect("session after profile answers")
}

pub(super) fn intake_config(routing: DocumentRouting) -> IntakeConfig {
    IntakeConfig {
        delivery: DeliveryConfig {
            attempts: 2,
            backoff: Duration::ZERO,
        },
        document_routing: routing,
        ..IntakeConfig::new(REVIEWER)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Outbound {
    Text(ChatId, String),
    Document(ChatId, DocumentHandle),
}

/// Transport double recording every successful send. Queued failures are consumed first.
#[derive(Default)]
pub(super) struct RecordingTransport {
    sent: Mutex<Vec<Outbound>>,
    failures: Mutex<VecDeque<String>>,
    fail_documents: Mutex<bool>,
}

impl RecordingTransport {
    pub(super) fn fail_next(&self, times: usize) {
        let mut guard = self.failures.lock().expect("failure mutex");
        for _ in 0..times {
            guard.push_back("simulated outage".to_string());
        }
    }

    pub(super) fn fail_all_documents(&self) {
        *self.fail_documents.lock().expect("document flag mutex") = true;
    }

    pub(super) fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().expect("sent mutex").clone()
    }

    pub(super) fn texts_to(&self, chat: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|outbound| match outbound {
                Outbound::Text(to, text) if to == chat => Some(text),
                _ => None,
            })
            .collect()
    }

    pub(super) fn documents_to(&self, chat: ChatId) -> Vec<DocumentHandle> {
        self.sent()
            .into_iter()
            .filter_map(|outbound| match outbound {
                Outbound::Document(to, handle) if to == chat => Some(handle),
                _ => None,
            })
            .collect()
    }

    fn take_failure(&self) -> Option<TransportError> {
        self.failures
            .lock()
            .expect("failure mutex")
            .pop_front()
            .map(TransportError::Unavailable)
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError> {
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.sent
            .lock()
            .expect("sent mutex")
            .push(Outbound::Text(chat, text.to_string()));
        Ok(())
    }

    async fn send_document(
        &self,
        chat: ChatId,
        handle: &DocumentHandle,
    ) -> Result<(), TransportError> {
        if *self.fail_documents.lock().expect("document flag mutex") {
            return Err(TransportError::Unavailable("document upload refused".to_string()));
        }
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        self.sent
            .lock()
            .expect("sent mutex")
            .push(Outbound::Document(chat, handle.clone()));
        Ok(())
    }
}

pub(super) type TestService = IntakeService<InMemorySessionStore, RecordingTransport>;

pub(super) fn service(
    routing: DocumentRouting,
) -> (TestService, Arc<InMemorySessionStore>, Arc<RecordingTransport>) {
    let store = Arc::new(InMemorySessionStore::default());
    let transport = Arc::new(RecordingTransport::default());
    let service = IntakeService::new(store.clone(), transport.clone(), intake_config(routing));
    (service, store, transport)
}
