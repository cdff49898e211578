//! Submission lifecycle: Idle -> Submitting -> Succeeded | Failed.

use std::sync::Arc;

use shared::{
    domain::{CaseMessage, Decision},
    error::SubmissionError,
};
use thiserror::Error;
use tokio::{
    sync::{broadcast, RwLock},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::TriageApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl Phase {
    /// Whether the current cycle has settled.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Snapshot of the controller's lifecycle. A decision exists only in
/// `Succeeded`, an error only in `Failed`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded(Decision),
    Failed(SubmissionError),
}

impl SubmissionState {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Submitting => Phase::Submitting,
            Self::Succeeded(_) => Phase::Succeeded,
            Self::Failed(_) => Phase::Failed,
        }
    }

    pub fn decision(&self) -> Option<&Decision> {
        match self {
            Self::Succeeded(decision) => Some(decision),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SubmissionError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("a triage submission is already in flight")]
    InFlight,
}

pub struct SubmissionController {
    api: Arc<dyn TriageApi>,
    state: RwLock<SubmissionState>,
    events: broadcast::Sender<SubmissionState>,
}

impl SubmissionController {
    pub fn new(api: Arc<dyn TriageApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            api,
            state: RwLock::new(SubmissionState::Idle),
            events,
        })
    }

    pub async fn state(&self) -> SubmissionState {
        self.state.read().await.clone()
    }

    /// Receives every state the controller enters from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SubmissionState> {
        self.events.subscribe()
    }

    /// Runs one cycle to completion. The outcome is published through the
    /// state; only a second submission during `Submitting` is refused.
    pub async fn submit(&self, message: impl Into<String>) -> Result<(), SubmitRejected> {
        let message = {
            let mut guard = self.state.write().await;
            if guard.phase() == Phase::Submitting {
                warn!("rejecting submission while another is in flight");
                return Err(SubmitRejected::InFlight);
            }

            match CaseMessage::parse(message) {
                Ok(message) => {
                    self.transition(&mut guard, SubmissionState::Submitting);
                    message
                }
                Err(err) => {
                    debug!(error = %err, "case message failed validation");
                    self.transition(&mut guard, SubmissionState::Failed(err));
                    return Ok(());
                }
            }
        };

        let next = match self.api.triage(&message).await {
            Ok(decision) => {
                info!(status = decision.status.as_str(), "submission succeeded");
                SubmissionState::Succeeded(decision)
            }
            Err(err) => {
                warn!(kind = ?err.kind(), status = ?err.status(), "submission failed");
                SubmissionState::Failed(err)
            }
        };

        let mut guard = self.state.write().await;
        self.transition(&mut guard, next);
        Ok(())
    }

    pub fn spawn_submit(
        self: &Arc<Self>,
        message: impl Into<String>,
    ) -> JoinHandle<Result<(), SubmitRejected>> {
        let controller = Arc::clone(self);
        let message = message.into();
        tokio::spawn(async move { controller.submit(message).await })
    }

    fn transition(&self, current: &mut SubmissionState, next: SubmissionState) {
        debug!(from = ?current.phase(), to = ?next.phase(), "submission state transition");
        *current = next.clone();
        // No subscribers is fine; the snapshot stays readable through `state`.
        let _ = self.events.send(next);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
