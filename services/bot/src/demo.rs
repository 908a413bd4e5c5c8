use crate::infra::ConsoleTransport;
use applicant_intake::config::{DeliveryConfig, IntakeConfig};
use applicant_intake::error::AppError;
use applicant_intake::workflows::intake::{
    ChatId, DocumentDescriptor, DocumentHandle, DocumentRouting, InMemorySessionStore,
    InboundEvent, IntakeService,
};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Chat id used for the simulated applicant
    #[arg(long, default_value_t = 1001)]
    pub(crate) applicant_chat_id: i64,
    /// Chat id used for the simulated reviewer
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub(crate) reviewer_chat_id: i64,
    /// Document routing strategy: `filename` or `step`
    #[arg(long, default_value = "filename", value_parser = parse_routing)]
    pub(crate) routing: DocumentRouting,
    /// Include a few invalid answers to show the re-prompts
    #[arg(long)]
    pub(crate) with_mistakes: bool,
}

fn parse_routing(raw: &str) -> Result<DocumentRouting, String> {
    DocumentRouting::parse(raw).ok_or_else(|| format!("unknown routing '{raw}'"))
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        applicant_chat_id,
        reviewer_chat_id,
        routing,
        with_mistakes,
    } = args;

    let applicant = ChatId(applicant_chat_id);
    let reviewer = ChatId(reviewer_chat_id);
    let transport = Arc::new(ConsoleTransport::new(reviewer));
    let config = IntakeConfig {
        document_routing: routing,
        delivery: DeliveryConfig {
            attempts: 1,
            backoff: Duration::ZERO,
        },
        ..IntakeConfig::new(reviewer)
    };
    let service = IntakeService::new(
        Arc::new(InMemorySessionStore::default()),
        transport.clone(),
        config,
    );

    println!("Applicant intake demo ({routing:?} routing)");
    for (label, event) in script(with_mistakes) {
        println!("\n> {label}");
        let handled = service.handle(applicant, event).await?;
        if let Some(step) = handled.step {
            println!("  step: {step}");
        }
        if handled.submitted {
            println!("  application submitted");
        }
    }

    println!(
        "\n- {} messages and documents forwarded to the reviewer",
        transport.forwarded()
    );
    Ok(())
}

fn script(with_mistakes: bool) -> Vec<(String, InboundEvent)> {
    let mut steps: Vec<(String, InboundEvent)> = vec![("/start".to_string(), InboundEvent::Start)];

    let answers: [(&str, Option<&str>); 6] = [
        ("Jane Doe", Some("Jane")),
        ("Engineer", None),
        ("1990-05-21", Some("21/05/1990")),
        ("Female", None),
        ("Berlin", None),
        ("+491701234567", Some("0170-123")),
    ];
    for (answer, mistake) in answers {
        if let (true, Some(wrong)) = (with_mistakes, mistake) {
            steps.push((wrong.to_string(), InboundEvent::from_text(wrong)));
        }
        steps.push((answer.to_string(), InboundEvent::from_text(answer)));
    }

    if with_mistakes {
        steps.push(upload("jane_doe_cv.pdf", "demo-cv-early"));
    }
    steps.push(upload("jane_doe_coverletter.pdf", "demo-cover-letter"));
    steps.push(upload("jane_doe_cv.pdf", "demo-cv"));
    steps
}

fn upload(file_name: &str, handle: &str) -> (String, InboundEvent) {
    let descriptor = DocumentDescriptor {
        mime_type: Some("application/pdf".to_string()),
        file_name: Some(file_name.to_string()),
        handle: DocumentHandle(handle.to_string()),
    };
    (
        format!("upload {file_name}"),
        InboundEvent::Document(descriptor),
    )
}
