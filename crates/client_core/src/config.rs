use std::{fs, io, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const SETTINGS_FILE: &str = "triage.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    /// `None` waits for the service indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout: None,
        }
    }
}

impl ClientSettings {
    pub fn with_overrides(mut self, base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        if let Some(v) = base_url {
            self.base_url = normalize_base_url(&v);
        }
        if let Some(secs) = timeout_secs {
            self.request_timeout = timeout_from_secs(secs);
        }
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
            if let Some(v) = file_cfg.base_url {
                settings.base_url = v;
            }
            if let Some(secs) = file_cfg.request_timeout_secs {
                settings.request_timeout = timeout_from_secs(secs);
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()));
        }
    }

    if let Some(v) = env("TRIAGE_API_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(secs) = v.trim().parse::<u64>() {
            settings.request_timeout = timeout_from_secs(secs);
        }
    }

    settings.base_url = normalize_base_url(&settings.base_url);
    Ok(settings)
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

pub fn normalize_base_url(raw_base_url: &str) -> String {
    let raw_base_url = raw_base_url.trim();

    if raw_base_url.is_empty() {
        return DEFAULT_BASE_URL.to_string();
    }

    raw_base_url.trim_end_matches('/').to_string()
}

/// Normalizes `raw_base_url` and checks that it is an absolute http(s) URL.
pub fn parse_base_url(raw_base_url: &str) -> anyhow::Result<String> {
    let base_url = normalize_base_url(raw_base_url);
    let parsed =
        Url::parse(&base_url).with_context(|| format!("invalid triage base url '{base_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "unsupported scheme '{}' in triage base url '{base_url}'",
            parsed.scheme()
        );
    }
    Ok(base_url)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
