//! Display rules for a decision and for the lifecycle as a whole.

use std::fmt;

use shared::domain::{Decision, DecisionStatus};

use crate::controller::SubmissionState;

pub const LOADING_TEXT: &str = "Analysing your case…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Accepted,
    Rejected,
    Neutral,
}

impl StatusClass {
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Accepted => "status-accepted",
            Self::Rejected => "status-rejected",
            Self::Neutral => "status-neutral",
        }
    }
}

impl From<&DecisionStatus> for StatusClass {
    fn from(status: &DecisionStatus) -> Self {
        match status {
            DecisionStatus::Accepted => Self::Accepted,
            DecisionStatus::Rejected => Self::Rejected,
            DecisionStatus::Neutral(_) => Self::Neutral,
        }
    }
}

pub fn classify_status(raw: Option<&str>) -> StatusClass {
    StatusClass::from(&DecisionStatus::classify(raw))
}

/// Whole-number percentage. Values outside [0,1] are not clamped.
pub fn confidence_percent(confidence: f64) -> i64 {
    (confidence * 100.0).round() as i64
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionView<'a> {
    pub status_label: &'a str,
    pub status_class: StatusClass,
    pub route: Option<&'a str>,
    pub confidence_percent: i64,
    pub explanation: &'a str,
    pub steps: Option<&'a [String]>,
}

impl<'a> From<&'a Decision> for DecisionView<'a> {
    fn from(decision: &'a Decision) -> Self {
        Self {
            status_label: decision.status.as_str(),
            status_class: StatusClass::from(&decision.status),
            route: decision.route.as_deref().filter(|route| !route.is_empty()),
            confidence_percent: confidence_percent(decision.confidence),
            explanation: &decision.explanation,
            steps: (!decision.steps.is_empty()).then_some(decision.steps.as_slice()),
        }
    }
}

impl fmt::Display for DecisionView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Decision [{}]", self.status_class.css_class())?;
        writeln!(f, "  Status: {}", self.status_label)?;
        if let Some(route) = self.route {
            writeln!(f, "  Recommended Route: {route}")?;
        }
        writeln!(f, "  Confidence: {}%", self.confidence_percent)?;
        writeln!(f)?;
        writeln!(f, "Explanation")?;
        write!(f, "  {}", self.explanation)?;
        if let Some(steps) = self.steps {
            writeln!(f)?;
            writeln!(f)?;
            write!(f, "Next Steps")?;
            for (index, step) in steps.iter().enumerate() {
                write!(f, "\n  {}. {step}", index + 1)?;
            }
        }
        Ok(())
    }
}

pub fn render_state(state: &SubmissionState) -> String {
    match state {
        SubmissionState::Idle => String::new(),
        SubmissionState::Submitting => LOADING_TEXT.to_string(),
        SubmissionState::Succeeded(decision) => DecisionView::from(decision).to_string(),
        SubmissionState::Failed(err) => err.to_string(),
    }
}
