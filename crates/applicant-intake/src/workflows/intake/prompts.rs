//! Outbound chat copy for the intake flow.

use super::domain::{DocumentKind, FullName, Step};

pub const WELCOME: &str = "Welcome! Please follow the instructions below to submit your documents:\n\n\
/start - Begin the application process.\n\
/coverletter - Upload your cover letter (PDF format).\n\
/cv - Upload your CV (PDF format).\n\
When uploading, please ensure the document has the appropriate filename \
('firstname_lastname_cv.pdf' or 'firstname_lastname_coverletter.pdf').";

pub const ASK_FULL_NAME: &str =
    "Hello! Please enter your full name (first name and last name) to start the application process.";
pub const ASK_JOB_TITLE: &str = "Thank you. Please enter your job title.";
pub const ASK_DATE_OF_BIRTH: &str = "Please enter your date of birth (YYYY-MM-DD).";
pub const ASK_GENDER: &str = "Please enter your gender (e.g., Male, Female, Other).";
pub const ASK_RESIDENCE: &str = "Please enter your residence location.";
pub const ASK_PHONE: &str = "Please enter your phone number.";

pub const APPLICATION_COMPLETE: &str =
    "Your CV has been received successfully! Thank you for completing your application.";
pub const DELIVERY_FAILED: &str = "Your CV was received, but we could not forward your application to the reviewer. \
Please send your CV again in a few minutes.";

pub fn ask_cover_letter(name: &FullName) -> String {
    format!(
        "Thank you. Now, please upload your cover letter (PDF format) with the filename format '{}'.",
        name.expected_file_name(DocumentKind::CoverLetter)
    )
}

pub fn cover_letter_command(name: &FullName) -> String {
    format!(
        "Please upload your cover letter PDF file and add the filename format '{}'.",
        name.expected_file_name(DocumentKind::CoverLetter)
    )
}

pub fn cover_letter_received(name: &FullName) -> String {
    format!(
        "Your cover letter has been received successfully! Now, please upload your CV (PDF format) with the filename format '{}'.",
        name.expected_file_name(DocumentKind::Cv)
    )
}

pub fn cv_command(name: &FullName) -> String {
    format!(
        "Please upload your CV PDF file and add the filename format '{}'.",
        name.expected_file_name(DocumentKind::Cv)
    )
}

/// Question asked while the session sits at one of the text steps.
pub fn question_for(step: Step) -> Option<&'static str> {
    match step {
        Step::AwaitingFullName => Some(ASK_FULL_NAME),
        Step::AwaitingJobTitle => Some(ASK_JOB_TITLE),
        Step::AwaitingDob => Some(ASK_DATE_OF_BIRTH),
        Step::AwaitingGender => Some(ASK_GENDER),
        Step::AwaitingResidence => Some(ASK_RESIDENCE),
        Step::AwaitingPhone => Some(ASK_PHONE),
        _ => None,
    }
}
