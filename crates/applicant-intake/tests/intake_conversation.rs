//! End-to-end conversation scenarios driven through the public service facade with a
//! recording transport standing in for the chat platform.

mod common {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use applicant_intake::config::{DeliveryConfig, IntakeConfig};
    use applicant_intake::workflows::intake::{
        ChatId, ChatTransport, DocumentDescriptor, DocumentHandle, InMemorySessionStore,
        InboundEvent, IntakeService, TransportError,
    };
    use async_trait::async_trait;

    pub const REVIEWER: ChatId = ChatId(-100_555);

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Sent {
        Text(ChatId, String),
        Document(ChatId, DocumentHandle),
    }

    #[derive(Default)]
    pub struct RecordingTransport {
        sent: Mutex<Vec<Sent>>,
    }

    impl RecordingTransport {
        pub fn sent(&self) -> Vec<Sent> {
            self.sent.lock().expect("sent mutex").clone()
        }
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), TransportError> {
            self.sent
                .lock()
                .expect("sent mutex")
                .push(Sent::Text(chat, text.to_string()));
            Ok(())
        }

        async fn send_document(
            &self,
            chat: ChatId,
            handle: &DocumentHandle,
        ) -> Result<(), TransportError> {
            self.sent
                .lock()
                .expect("sent mutex")
                .push(Sent::Document(chat, handle.clone()));
            Ok(())
        }
    }

    pub fn service() -> (
        IntakeService<InMemorySessionStore, RecordingTransport>,
        Arc<RecordingTransport>,
    ) {
        let transport = Arc::new(RecordingTransport::default());
        let config = IntakeConfig {
            delivery: DeliveryConfig {
                attempts: 1,
                backoff: Duration::ZERO,
            },
            ..IntakeConfig::new(REVIEWER)
        };
        let service = IntakeService::new(
            Arc::new(InMemorySessionStore::default()),
            transport.clone(),
            config,
        );
        (service, transport)
    }

    pub fn pdf(file_name: &str, handle: &str) -> InboundEvent {
        InboundEvent::Document(DocumentDescriptor {
            mime_type: Some("application/pdf".to_string()),
            file_name: Some(file_name.to_string()),
            handle: DocumentHandle(handle.to_string()),
        })
    }
}

use applicant_intake::workflows::intake::{ChatId, DocumentHandle, InboundEvent, Step};
use common::{pdf, service, Sent, REVIEWER};

#[tokio::test]
async fn new_applicant_completes_the_flow_and_reviewer_is_notified() {
    let (service, transport) = service();
    let applicant = ChatId(31337);

    for answer in [
        "Jane Doe",
        "Engineer",
        "1990-05-21",
        "Female",
        "Berlin",
        "+491701234567",
    ] {
        service
            .handle(applicant, InboundEvent::from_text(answer))
            .await
            .expect("answer handled");
    }
    let session = service
        .session(applicant)
        .expect("store readable")
        .expect("session exists");
    assert_eq!(session.step, Step::AwaitingCoverLetter);

    let handled = service
        .handle(applicant, pdf("jane_doe_coverletter.pdf", "doc-cover"))
        .await
        .expect("cover letter handled");
    assert_eq!(handled.step, Some(Step::CoverLetterUploaded));

    let handled = service
        .handle(applicant, pdf("jane_doe_cv.pdf", "doc-cv"))
        .await
        .expect("cv handled");
    assert_eq!(handled.step, Some(Step::CvUploaded));
    assert!(handled.submitted);

    let sent = transport.sent();
    let to_reviewer: Vec<&Sent> = sent
        .iter()
        .filter(|item| matches!(item, Sent::Text(chat, _) | Sent::Document(chat, _) if *chat == REVIEWER))
        .collect();
    assert_eq!(to_reviewer.len(), 3);
    match to_reviewer[0] {
        Sent::Text(_, summary) => {
            assert!(summary.contains("Full Name: Jane Doe"));
            assert!(summary.contains("Phone Number: +491701234567"));
        }
        other => panic!("expected summary text first, got {other:?}"),
    }
    assert_eq!(
        to_reviewer[1],
        &Sent::Document(REVIEWER, DocumentHandle("doc-cover".to_string()))
    );
    assert_eq!(
        to_reviewer[2],
        &Sent::Document(REVIEWER, DocumentHandle("doc-cv".to_string()))
    );

    match sent.last() {
        Some(Sent::Text(chat, text)) => {
            assert_eq!(*chat, applicant);
            assert!(text.contains("Thank you for completing your application"));
        }
        other => panic!("expected confirmation to the applicant, got {other:?}"),
    }
}

#[tokio::test]
async fn slash_commands_route_through_the_same_flow() {
    let (service, transport) = service();
    let applicant = ChatId(7);

    service
        .handle(applicant, InboundEvent::from_text("/start"))
        .await
        .expect("start handled");
    service
        .handle(applicant, InboundEvent::from_text("John Smith"))
        .await
        .expect("name handled");

    for _ in 0..2 {
        let handled = service
            .handle(applicant, InboundEvent::from_text("/coverletter"))
            .await
            .expect("command handled");
        assert_eq!(handled.step, Some(Step::AwaitingCoverLetter));
    }

    let handled = service
        .handle(applicant, pdf("john_smith_cv.pdf", "early-cv"))
        .await
        .expect("upload handled");
    assert_eq!(handled.step, Some(Step::AwaitingCoverLetter));

    let last_reply = transport.sent().pop();
    assert_eq!(
        last_reply,
        Some(Sent::Text(
            applicant,
            "Please upload your cover letter first with the filename format 'john_smith_coverletter.pdf'."
                .to_string()
        ))
    );
    assert!(transport
        .sent()
        .iter()
        .all(|item| !matches!(item, Sent::Text(chat, _) | Sent::Document(chat, _) if *chat == REVIEWER)));
}
