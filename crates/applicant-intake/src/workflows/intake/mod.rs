//! Conversational job application intake.
//!
//! A chat walks through six profile questions, then uploads a cover letter and a CV whose
//! file names are derived from the applicant's name. Once both documents are in, the
//! application is forwarded to the reviewer chat by document handle.

pub mod domain;
pub mod machine;
pub mod prompts;
pub mod service;
pub mod store;
pub mod transport;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    ChatId, CompletedApplication, DocumentDescriptor, DocumentHandle, DocumentKind, FullName,
    Profile, Session, Step, UploadedFiles,
};
pub use machine::{DocumentRouting, IntakeMachine, Transition};
pub use service::{Handled, IntakeService, IntakeServiceError};
pub use store::{InMemorySessionStore, SessionStore, StoreError};
pub use transport::{ChatTransport, InboundEvent, IntakeCommand, TransportError};
pub use validation::Rejection;
