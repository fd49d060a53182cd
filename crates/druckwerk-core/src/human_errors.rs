// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the kiosk touchscreen.
//
// Walk-up users cannot parse technical errors, so every failure is mapped to
// plain language with a clear suggestion. Severity drives UI presentation.

use crate::error::DruckwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A blip — trying again is likely to work.
    Transient,
    /// The user must do something (wait, re-upload, pay differently).
    ActionRequired,
    /// Cannot be fixed by retrying — wrong file type, broken document.
    Permanent,
}

/// A plain-language error with an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the kiosk should offer a Retry button.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `DruckwerkError` into something a walk-up user can act on.
pub fn humanize_error(err: &DruckwerkError) -> HumanError {
    match err {
        DruckwerkError::UnsupportedFormat(detail) => HumanError {
            message: "This type of file can't be printed here.".into(),
            suggestion: format!(
                "Please bring a PDF, DOC, or DOCX file. (File type: {detail})"
            ),
            retriable: false,
            severity: Severity::Permanent,
        },

        DruckwerkError::MalformedRequest(_) => HumanError {
            message: "Something went wrong with that request.".into(),
            suggestion: "Please start again from the upload screen.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        DruckwerkError::SlotOccupied => HumanError {
            message: "The kiosk is busy with another document.".into(),
            suggestion: "Please wait for the current print to finish, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        DruckwerkError::InvalidState { .. } => HumanError {
            message: "That can't be done right now.".into(),
            suggestion: "The document has already moved on to the next step. Check the screen for its current status.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DruckwerkError::StaleReference(_) | DruckwerkError::UnknownJob(_) => HumanError {
            message: "We lost track of that document.".into(),
            suggestion: "It may have already printed or been replaced. Please upload your file again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        DruckwerkError::Resolution(_) => HumanError {
            message: "We couldn't read that document.".into(),
            suggestion: "The file may be empty or damaged. Try opening it on your own device first, or bring a different copy.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        DruckwerkError::Payment(detail) => HumanError {
            message: "The payment didn't go through.".into(),
            suggestion: format!("No money was taken for an unprinted document. Please upload again and retry the payment. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        DruckwerkError::Print(detail) => HumanError {
            message: "The printer had a problem.".into(),
            suggestion: format!("Please ask staff for help or try again in a moment. ({detail})"),
            retriable: true,
            severity: Severity::Transient,
        },

        DruckwerkError::Config(_) | DruckwerkError::Internal(_) => HumanError {
            message: "The kiosk hit an internal problem.".into(),
            suggestion: "Please try again. If this keeps happening, ask staff to restart the kiosk.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        DruckwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "Your file couldn't be found.".into(),
                    suggestion: "The upload may not have finished. Please upload the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem storing your file.".into(),
                    suggestion: "Please try again. The kiosk's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        DruckwerkError::Serialization(_) => HumanError {
            message: "The kiosk had an internal data problem.".into(),
            suggestion: "Please try again. If this keeps happening, ask staff for help.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobState;

    #[test]
    fn unsupported_format_is_permanent() {
        let human = humanize_error(&DruckwerkError::UnsupportedFormat("txt".into()));
        assert_eq!(human.severity, Severity::Permanent);
        assert!(!human.retriable);
        assert!(human.suggestion.contains("PDF"));
    }

    #[test]
    fn busy_slot_asks_user_to_wait() {
        let human = humanize_error(&DruckwerkError::SlotOccupied);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.retriable);
    }

    #[test]
    fn frozen_mode_is_action_required() {
        let human = humanize_error(&DruckwerkError::InvalidState {
            operation: "set print mode".into(),
            state: JobState::AwaitingPayment,
        });
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn payment_failure_is_retriable() {
        let human = humanize_error(&DruckwerkError::Payment("acquirer timeout".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
        assert!(human.suggestion.contains("acquirer timeout"));
    }

    #[test]
    fn missing_file_is_action_required() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let human = humanize_error(&DruckwerkError::Io(io));
        assert_eq!(human.severity, Severity::ActionRequired);
    }
}
