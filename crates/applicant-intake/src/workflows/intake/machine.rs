use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    ChatId, CompletedApplication, DocumentDescriptor, DocumentKind, FullName, Session, Step,
};
use super::prompts;
use super::transport::{InboundEvent, IntakeCommand};
use super::validation::{
    parse_full_name, validate_date_of_birth, validate_gender, validate_job_title, validate_phone,
    validate_residence, Rejection,
};

/// How an uploaded document is matched to the attachment it is meant to be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRouting {
    /// Infer the kind from `cv` / `coverletter` in the file name, regardless of step.
    #[default]
    FileName,
    /// Infer the kind from the current step; the file name only decides outside the
    /// document steps.
    Step,
}

impl DocumentRouting {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "filename" | "file_name" => Some(Self::FileName),
            "step" => Some(Self::Step),
            _ => None,
        }
    }

    fn classify(self, step: Step, file_name: &str) -> Option<DocumentKind> {
        match (self, step) {
            (DocumentRouting::Step, Step::AwaitingCoverLetter) => Some(DocumentKind::CoverLetter),
            (DocumentRouting::Step, Step::CoverLetterUploaded | Step::AwaitingCv) => {
                Some(DocumentKind::Cv)
            }
            _ => kind_from_file_name(file_name),
        }
    }
}

fn kind_from_file_name(file_name: &str) -> Option<DocumentKind> {
    if file_name.contains(DocumentKind::Cv.file_suffix()) {
        Some(DocumentKind::Cv)
    } else if file_name.contains(DocumentKind::CoverLetter.file_suffix()) {
        Some(DocumentKind::CoverLetter)
    } else {
        None
    }
}

/// Result of applying one inbound event to a chat's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Session state to store; `None` when no session exists and none was started.
    pub session: Option<Session>,
    pub replies: Vec<String>,
    /// Set when the CV was accepted and the application is ready for the reviewer.
    pub completed: Option<CompletedApplication>,
}

impl Transition {
    fn reply(session: Option<Session>, reply: impl Into<String>) -> Self {
        Self {
            session,
            replies: vec![reply.into()],
            completed: None,
        }
    }

    fn outcome(session: Session, outcome: Result<String, Rejection>) -> Self {
        let reply = outcome.unwrap_or_else(|rejection| rejection.to_string());
        Self::reply(Some(session), reply)
    }
}

/// Pure step machine: validates input against the current step and advances it.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeMachine {
    routing: DocumentRouting,
}

impl IntakeMachine {
    pub fn new(routing: DocumentRouting) -> Self {
        Self { routing }
    }

    pub fn routing(&self) -> DocumentRouting {
        self.routing
    }

    pub fn apply(
        &self,
        chat: ChatId,
        session: Option<Session>,
        event: InboundEvent,
        now: DateTime<Utc>,
    ) -> Transition {
        let before = session.as_ref().map(|session| session.step);
        let transition = match event {
            InboundEvent::Start => Transition {
                session: Some(Session::new(now)),
                replies: vec![prompts::WELCOME.to_string(), prompts::ASK_FULL_NAME.to_string()],
                completed: None,
            },
            InboundEvent::Text(text) => {
                let mut session = session.unwrap_or_else(|| Session::new(now));
                session.touch(now);
                let outcome = accept_text(&mut session, text.trim());
                Transition::outcome(session, outcome)
            }
            InboundEvent::Command(command) => self.accept_command(session, command, now),
            InboundEvent::Document(document) => self.accept_document(chat, session, document, now),
        };

        if let Some(after) = transition.session.as_ref().map(|session| session.step) {
            if before != Some(after) {
                debug!(%chat, from = ?before.map(Step::label), to = after.label(), "step changed");
            }
        }
        transition
    }

    fn accept_command(
        &self,
        session: Option<Session>,
        command: IntakeCommand,
        now: DateTime<Utc>,
    ) -> Transition {
        let Some(mut session) = session else {
            return Transition::reply(None, Rejection::NameRequired.to_string());
        };
        session.touch(now);
        let Some(name) = session.full_name().cloned() else {
            return Transition::reply(Some(session), Rejection::NameRequired.to_string());
        };

        let outcome = match command {
            IntakeCommand::CoverLetter => match session.step {
                step if step <= Step::AwaitingCoverLetter => {
                    session.step = Step::AwaitingCoverLetter;
                    Ok(prompts::cover_letter_command(&name))
                }
                Step::CvUploaded => Err(Rejection::AlreadyComplete),
                _ => Err(Rejection::CoverLetterAlreadyReceived {
                    expected: name.expected_file_name(DocumentKind::Cv),
                }),
            },
            IntakeCommand::Cv => match session.step {
                Step::CoverLetterUploaded | Step::AwaitingCv => {
                    session.step = Step::AwaitingCv;
                    Ok(prompts::cv_command(&name))
                }
                Step::CvUploaded => Err(Rejection::AlreadyComplete),
                _ => Err(Rejection::CoverLetterFirst {
                    expected: name.expected_file_name(DocumentKind::CoverLetter),
                }),
            },
        };
        Transition::outcome(session, outcome)
    }

    fn accept_document(
        &self,
        chat: ChatId,
        session: Option<Session>,
        document: DocumentDescriptor,
        now: DateTime<Utc>,
    ) -> Transition {
        let mut session = session;
        if let Some(session) = session.as_mut() {
            session.touch(now);
        }

        if !document.is_pdf() {
            return Transition::reply(session, Rejection::NotPdf.to_string());
        }
        let (mut session, name) = match session {
            Some(session) => match session.full_name().cloned() {
                Some(name) => (session, name),
                None => return Transition::reply(Some(session), Rejection::NameRequired.to_string()),
            },
            None => return Transition::reply(None, Rejection::NameRequired.to_string()),
        };

        let file_name = document.normalized_file_name();
        let Some(kind) = self.routing.classify(session.step, &file_name) else {
            let rejection = Rejection::UnknownDocument {
                cover_letter: name.expected_file_name(DocumentKind::CoverLetter),
                cv: name.expected_file_name(DocumentKind::Cv),
            };
            return Transition::outcome(session, Err(rejection));
        };

        let expected = name.expected_file_name(kind);
        if file_name != expected {
            let rejection = match kind {
                DocumentKind::CoverLetter => Rejection::CoverLetterFileName { expected },
                DocumentKind::Cv => Rejection::CvFileName { expected },
            };
            return Transition::outcome(session, Err(rejection));
        }

        match kind {
            DocumentKind::CoverLetter => {
                let outcome = accept_cover_letter(&mut session, &name, document);
                Transition::outcome(session, outcome)
            }
            DocumentKind::Cv => match accept_cv(&mut session, &name, document) {
                Ok(()) => Transition {
                    completed: CompletedApplication::from_session(chat, &session),
                    session: Some(session),
                    replies: Vec::new(),
                },
                Err(rejection) => Transition::outcome(session, Err(rejection)),
            },
        }
    }
}

fn accept_text(session: &mut Session, text: &str) -> Result<String, Rejection> {
    let profile = &mut session.profile;
    let (next, reply) = match session.step {
        Step::AwaitingFullName => {
            profile.full_name = Some(parse_full_name(text)?);
            (Step::AwaitingJobTitle, prompts::ASK_JOB_TITLE.to_string())
        }
        Step::AwaitingJobTitle => {
            profile.job_title = Some(validate_job_title(text)?.to_string());
            (Step::AwaitingDob, prompts::ASK_DATE_OF_BIRTH.to_string())
        }
        Step::AwaitingDob => {
            profile.date_of_birth = Some(validate_date_of_birth(text)?.to_string());
            (Step::AwaitingGender, prompts::ASK_GENDER.to_string())
        }
        Step::AwaitingGender => {
            profile.gender = Some(validate_gender(text)?.to_string());
            (Step::AwaitingResidence, prompts::ASK_RESIDENCE.to_string())
        }
        Step::AwaitingResidence => {
            profile.residence = Some(validate_residence(text)?.to_string());
            (Step::AwaitingPhone, prompts::ASK_PHONE.to_string())
        }
        Step::AwaitingPhone => {
            profile.phone = Some(validate_phone(text)?.to_string());
            let name = profile.full_name.as_ref().ok_or(Rejection::NameRequired)?;
            (Step::AwaitingCoverLetter, prompts::ask_cover_letter(name))
        }
        Step::CvUploaded => return Err(Rejection::AlreadyComplete),
        step => return Err(document_expected(session, step)),
    };
    session.step = next;
    Ok(reply)
}

fn document_expected(session: &Session, step: Step) -> Rejection {
    let kind = if step == Step::AwaitingCoverLetter {
        DocumentKind::CoverLetter
    } else {
        DocumentKind::Cv
    };
    match session.full_name() {
        Some(name) => Rejection::DocumentExpected {
            document: kind.display_name(),
            expected: name.expected_file_name(kind),
        },
        None => Rejection::NameRequired,
    }
}

fn accept_cover_letter(
    session: &mut Session,
    name: &FullName,
    document: DocumentDescriptor,
) -> Result<String, Rejection> {
    match session.step {
        Step::AwaitingCoverLetter => {
            session.files.cover_letter = Some(document.handle);
            session.step = Step::CoverLetterUploaded;
            Ok(prompts::cover_letter_received(name))
        }
        Step::CvUploaded => Err(Rejection::AlreadyComplete),
        step if step.collects_text() => Err(Rejection::ProfileIncomplete {
            pending: prompts::question_for(step).unwrap_or_default().to_string(),
        }),
        _ => Err(Rejection::CoverLetterAlreadyReceived {
            expected: name.expected_file_name(DocumentKind::Cv),
        }),
    }
}

fn accept_cv(
    session: &mut Session,
    name: &FullName,
    document: DocumentDescriptor,
) -> Result<(), Rejection> {
    match session.step {
        Step::CoverLetterUploaded | Step::AwaitingCv => {
            session.files.cv = Some(document.handle);
            session.step = Step::CvUploaded;
            Ok(())
        }
        Step::CvUploaded => Err(Rejection::AlreadyComplete),
        _ => Err(Rejection::CoverLetterFirst {
            expected: name.expected_file_name(DocumentKind::CoverLetter),
        }),
    }
}
