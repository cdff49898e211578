use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{CaseMessage, Decision},
    error::SubmissionError,
    protocol::{HealthResponse, TriageRequest, HEALTH_PATH, TRIAGE_PATH},
};
use tracing::{info, warn};

pub mod config;
pub mod controller;
pub mod render;

pub use config::{load_settings, ClientSettings};
pub use controller::{Phase, SubmissionController, SubmissionState, SubmitRejected};

/// One request/response exchange with the triage service.
///
/// Implementations classify every failure into a [`SubmissionError`]; nothing
/// escapes this boundary unclassified.
#[async_trait]
pub trait TriageApi: Send + Sync {
    async fn triage(&self, message: &CaseMessage) -> Result<Decision, SubmissionError>;
}

pub struct TriageClient {
    http: Client,
    base_url: String,
}

impl TriageClient {
    pub fn new(settings: &ClientSettings) -> Result<Self> {
        let base_url = config::parse_base_url(&settings.base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build triage http client")?;
        Ok(Self { http, base_url })
    }

    pub fn with_http_client(http: Client, base_url: impl AsRef<str>) -> Self {
        Self {
            http,
            base_url: config::normalize_base_url(base_url.as_ref()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthResponse, SubmissionError> {
        let url = format!("{}{HEALTH_PATH}", self.base_url);
        info!(url = %url, "probing triage service health");
        let response = self.http.get(&url).send().await.map_err(transport_error)?;
        read_json(response).await
    }
}

#[async_trait]
impl TriageApi for TriageClient {
    async fn triage(&self, message: &CaseMessage) -> Result<Decision, SubmissionError> {
        let url = format!("{}{TRIAGE_PATH}", self.base_url);
        info!(
            url = %url,
            chars = message.as_str().chars().count(),
            "submitting case for triage"
        );
        let response = self
            .http
            .post(&url)
            .json(&TriageRequest {
                message: message.as_str().to_string(),
            })
            .send()
            .await
            .map_err(transport_error)?;

        let decision: Decision = read_json(response).await?;
        info!(
            status = decision.status.as_str(),
            confidence = decision.confidence,
            steps = decision.steps.len(),
            "triage decision received"
        );
        Ok(decision)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, SubmissionError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "triage service returned an error status");
        return Err(SubmissionError::Service {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await.map_err(transport_error)?;
    serde_json::from_str(&body).map_err(|err| {
        warn!(error = %err, "triage service returned an undecodable body");
        SubmissionError::decode(err.to_string())
    })
}

fn transport_error(err: reqwest::Error) -> SubmissionError {
    let message = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    warn!(error = %message, "triage request did not complete");
    SubmissionError::transport(message)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
