use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Transport,
    Service,
    Decode,
}

/// Failure of one submission cycle.
///
/// Validation failures are raised before any network activity; the other
/// kinds are produced at the triage client boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Please describe your situation in at least {min_chars} characters.")]
    Validation {
        min_chars: usize,
        actual_chars: usize,
    },
    #[error("Triage service unreachable: {message}")]
    Transport { message: String },
    #[error("Triage request failed ({status}): {body}")]
    Service { status: u16, body: String },
    #[error("Malformed triage response: {message}")]
    Decode { message: String },
}

impl SubmissionError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Service { .. } => ErrorKind::Service,
            Self::Decode { .. } => ErrorKind::Decode,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_keeps_status_and_body_verbatim() {
        let err = SubmissionError::Service {
            status: 500,
            body: "internal error".into(),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(err.to_string(), "Triage request failed (500): internal error");
    }

    #[test]
    fn only_service_errors_carry_status() {
        assert_eq!(SubmissionError::transport("refused").status(), None);
        assert_eq!(SubmissionError::decode("eof").status(), None);
        let validation = SubmissionError::Validation {
            min_chars: 10,
            actual_chars: 3,
        };
        assert_eq!(validation.status(), None);
        assert!(validation.is_validation());
    }
}
