use serde::{Deserialize, Serialize};

use crate::error::SubmissionError;

/// Minimum number of characters a case description must hold once
/// surrounding whitespace is ignored.
pub const MIN_CASE_MESSAGE_CHARS: usize = 10;

/// A case description that passed local validation.
///
/// The wrapped text is the caller's input verbatim; trimming is only applied
/// when measuring it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseMessage(String);

impl CaseMessage {
    pub fn parse(raw: impl Into<String>) -> Result<Self, SubmissionError> {
        let raw = raw.into();
        let actual_chars = trimmed_char_count(&raw);
        if actual_chars < MIN_CASE_MESSAGE_CHARS {
            return Err(SubmissionError::Validation {
                min_chars: MIN_CASE_MESSAGE_CHARS,
                actual_chars,
            });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for CaseMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub fn trimmed_char_count(raw: &str) -> usize {
    raw.trim().chars().count()
}

pub fn is_valid_case_message(raw: &str) -> bool {
    trimmed_char_count(raw) >= MIN_CASE_MESSAGE_CHARS
}

/// Verdict reported by the triage service.
///
/// Only the two exact upper-case spellings are recognised; every other value,
/// including a missing or null status, is kept as `Neutral` with its original
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum DecisionStatus {
    Accepted,
    Rejected,
    Neutral(String),
}

impl DecisionStatus {
    pub const ACCEPTED: &'static str = "ACCEPTED";
    pub const REJECTED: &'static str = "REJECTED";

    pub fn classify(raw: Option<&str>) -> Self {
        match raw {
            Some(Self::ACCEPTED) => Self::Accepted,
            Some(Self::REJECTED) => Self::Rejected,
            Some(other) => Self::Neutral(other.to_string()),
            None => Self::Neutral(String::new()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Accepted => Self::ACCEPTED,
            Self::Rejected => Self::REJECTED,
            Self::Neutral(raw) => raw,
        }
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Self::Neutral(_))
    }
}

impl Default for DecisionStatus {
    fn default() -> Self {
        Self::Neutral(String::new())
    }
}

impl From<Option<String>> for DecisionStatus {
    fn from(value: Option<String>) -> Self {
        Self::classify(value.as_deref())
    }
}

impl From<DecisionStatus> for String {
    fn from(value: DecisionStatus) -> Self {
        match value {
            DecisionStatus::Neutral(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Successful triage outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default)]
    pub status: DecisionStatus,
    #[serde(default)]
    pub route: Option<String>,
    pub confidence: f64,
    pub explanation: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub steps: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
