use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chat identity used to key sessions and address outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque transport reference to an uploaded file; forwarding reuses it instead of the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentHandle(pub String);

/// Metadata the transport reports for an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDescriptor {
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub handle: DocumentHandle,
}

impl DocumentDescriptor {
    pub fn is_pdf(&self) -> bool {
        self.mime_type
            .as_deref()
            .and_then(|raw| raw.parse::<mime::Mime>().ok())
            .map(|declared| declared.essence_str() == mime::APPLICATION_PDF.essence_str())
            .unwrap_or(false)
    }

    /// Lower-cased file name, empty when the transport did not report one.
    pub fn normalized_file_name(&self) -> String {
        self.file_name
            .as_deref()
            .map(|name| name.trim().to_lowercase())
            .unwrap_or_default()
    }
}

/// Conversation stages in their fixed order. Derived ordering follows declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AwaitingFullName,
    AwaitingJobTitle,
    AwaitingDob,
    AwaitingGender,
    AwaitingResidence,
    AwaitingPhone,
    AwaitingCoverLetter,
    CoverLetterUploaded,
    AwaitingCv,
    CvUploaded,
}

impl Step {
    pub const ALL: [Step; 10] = [
        Step::AwaitingFullName,
        Step::AwaitingJobTitle,
        Step::AwaitingDob,
        Step::AwaitingGender,
        Step::AwaitingResidence,
        Step::AwaitingPhone,
        Step::AwaitingCoverLetter,
        Step::CoverLetterUploaded,
        Step::AwaitingCv,
        Step::CvUploaded,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Step::AwaitingFullName => "awaiting_full_name",
            Step::AwaitingJobTitle => "awaiting_job_title",
            Step::AwaitingDob => "awaiting_dob",
            Step::AwaitingGender => "awaiting_gender",
            Step::AwaitingResidence => "awaiting_residence",
            Step::AwaitingPhone => "awaiting_phone",
            Step::AwaitingCoverLetter => "awaiting_coverletter",
            Step::CoverLetterUploaded => "coverletter_uploaded",
            Step::AwaitingCv => "awaiting_cv",
            Step::CvUploaded => "cv_uploaded",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Step::CvUploaded)
    }

    /// True while the flow still expects one of the profile text answers.
    pub fn collects_text(self) -> bool {
        self < Step::AwaitingCoverLetter
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two attachments an application requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    CoverLetter,
    Cv,
}

impl DocumentKind {
    pub const fn file_suffix(self) -> &'static str {
        match self {
            DocumentKind::CoverLetter => "coverletter",
            DocumentKind::Cv => "cv",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            DocumentKind::CoverLetter => "cover letter",
            DocumentKind::Cv => "CV",
        }
    }
}

/// Accepted applicant name: exactly a first and last token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullName {
    raw: String,
    first: String,
    last: String,
}

impl FullName {
    pub(crate) fn from_parts(raw: &str, first: &str, last: &str) -> Self {
        Self {
            raw: raw.to_string(),
            first: first.to_string(),
            last: last.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    /// Filename the applicant must use for the given attachment, e.g. `jane_doe_cv.pdf`.
    pub fn expected_file_name(&self, kind: DocumentKind) -> String {
        format!(
            "{}_{}_{}.pdf",
            self.first.to_lowercase(),
            self.last.to_lowercase(),
            kind.file_suffix()
        )
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Profile answers collected one step at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub full_name: Option<FullName>,
    pub job_title: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub residence: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFiles {
    pub cover_letter: Option<DocumentHandle>,
    pub cv: Option<DocumentHandle>,
}

/// Per-chat conversation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub step: Step,
    pub profile: Profile,
    pub files: UploadedFiles,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            step: Step::AwaitingFullName,
            profile: Profile::default(),
            files: UploadedFiles::default(),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn full_name(&self) -> Option<&FullName> {
        self.profile.full_name.as_ref()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }

    pub fn is_idle_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_activity < cutoff
    }
}

/// Consolidated application forwarded to the reviewer once both documents are in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedApplication {
    pub applicant: ChatId,
    pub profile: Profile,
    pub cover_letter: DocumentHandle,
    pub cv: DocumentHandle,
}

impl CompletedApplication {
    /// Builds the application from a session that has reached `cv_uploaded`.
    pub fn from_session(applicant: ChatId, session: &Session) -> Option<Self> {
        if session.step != Step::CvUploaded {
            return None;
        }
        Some(Self {
            applicant,
            profile: session.profile.clone(),
            cover_letter: session.files.cover_letter.clone()?,
            cv: session.files.cv.clone()?,
        })
    }

    /// Reviewer-facing text. Answers skipped via `/coverletter` show as "not provided".
    pub fn summary(&self) -> String {
        let profile = &self.profile;
        format!(
            "New application received:\n\n\
             Full Name: {}\n\
             Job Title: {}\n\
             Date of Birth: {}\n\
             Gender: {}\n\
             Residence Location: {}\n\
             Phone Number: {}",
            or_missing(profile.full_name.as_ref().map(FullName::as_str)),
            or_missing(profile.job_title.as_deref()),
            or_missing(profile.date_of_birth.as_deref()),
            or_missing(profile.gender.as_deref()),
            or_missing(profile.residence.as_deref()),
            or_missing(profile.phone.as_deref()),
        )
    }
}

fn or_missing(value: Option<&str>) -> &str {
    value.unwrap_or("not provided")
}
