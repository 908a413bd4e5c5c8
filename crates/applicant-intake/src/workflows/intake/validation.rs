use std::sync::OnceLock;

use regex::Regex;

use super::domain::FullName;

/// Corrective prompts returned to the applicant when an input is not accepted.
///
/// The `Display` text is sent verbatim, so every variant reads as a chat reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Please enter a valid full name (first name and last name).")]
    InvalidFullName,
    #[error("Please enter your job title.")]
    MissingJobTitle,
    #[error("Please enter a valid date of birth in the format YYYY-MM-DD.")]
    InvalidDateOfBirth,
    #[error("Please enter a valid gender (Male, Female, Other).")]
    InvalidGender,
    #[error("Please enter a valid residence location.")]
    MissingResidence,
    #[error("Please enter a valid phone number (10-15 digits).")]
    InvalidPhone,
    #[error("Please upload a PDF file.")]
    NotPdf,
    #[error("Please provide your full name first by sending it as a message.")]
    NameRequired,
    #[error("Please answer the remaining questions before uploading documents. {pending}")]
    ProfileIncomplete { pending: String },
    #[error("Please upload your cover letter first with the filename format '{expected}'.")]
    CoverLetterFirst { expected: String },
    #[error("Please upload your cover letter with the filename format '{expected}'.")]
    CoverLetterFileName { expected: String },
    #[error("Please upload your CV with the filename format '{expected}'.")]
    CvFileName { expected: String },
    #[error(
        "You have already uploaded your cover letter. Please upload your CV with the filename format '{expected}'."
    )]
    CoverLetterAlreadyReceived { expected: String },
    #[error("Please specify whether this is a '{cover_letter}' or '{cv}' in the filename.")]
    UnknownDocument { cover_letter: String, cv: String },
    #[error("Please upload your {document} (PDF format) with the filename format '{expected}'.")]
    DocumentExpected {
        document: &'static str,
        expected: String,
    },
    #[error("Your application is already complete. Send /start to submit a new one.")]
    AlreadyComplete,
}

const GENDERS: [&str; 3] = ["male", "female", "other"];

fn full_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z]+)\s+([A-Za-z]+)$").expect("full name pattern compiles")
    })
}

fn date_of_birth_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("dob pattern compiles")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\+?[0-9]{10,15}$").expect("phone pattern compiles"))
}

pub fn parse_full_name(text: &str) -> Result<FullName, Rejection> {
    let captures = full_name_pattern()
        .captures(text)
        .ok_or(Rejection::InvalidFullName)?;
    Ok(FullName::from_parts(text, &captures[1], &captures[2]))
}

pub fn validate_job_title(text: &str) -> Result<&str, Rejection> {
    non_empty(text).ok_or(Rejection::MissingJobTitle)
}

/// Shape check only; the calendar date itself is not verified.
pub fn validate_date_of_birth(text: &str) -> Result<&str, Rejection> {
    if date_of_birth_pattern().is_match(text) {
        Ok(text)
    } else {
        Err(Rejection::InvalidDateOfBirth)
    }
}

pub fn validate_gender(text: &str) -> Result<&str, Rejection> {
    let lowered = text.to_lowercase();
    if GENDERS.contains(&lowered.as_str()) {
        Ok(text)
    } else {
        Err(Rejection::InvalidGender)
    }
}

pub fn validate_residence(text: &str) -> Result<&str, Rejection> {
    non_empty(text).ok_or(Rejection::MissingResidence)
}

pub fn validate_phone(text: &str) -> Result<&str, Rejection> {
    if phone_pattern().is_match(text) {
        Ok(text)
    } else {
        Err(Rejection::InvalidPhone)
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
