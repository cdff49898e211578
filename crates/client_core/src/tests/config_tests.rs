use super::*;

use std::{
    collections::HashMap,
    env,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

fn temp_settings_path(contents: Option<&str>) -> (PathBuf, PathBuf) {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let seq = NEXT_DIR.fetch_add(1, Ordering::Relaxed);
    let temp_root = env::temp_dir().join(format!("triage_client_config_test_{suffix}_{seq}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join(SETTINGS_FILE);
    if let Some(contents) = contents {
        fs::write(&path, contents).expect("write settings");
    }
    (temp_root, path)
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_to_local_service_without_timeout() {
    let (temp_root, path) = temp_settings_path(None);

    let settings = load_settings_from(&path, env_from(&[])).expect("settings");

    assert_eq!(settings, ClientSettings::default());
    assert_eq!(settings.base_url, "http://127.0.0.1:8000");
    assert_eq!(settings.request_timeout, None);
    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn reads_settings_file() {
    let (temp_root, path) = temp_settings_path(Some(
        "base_url = \"https://triage.example.org/\"\nrequest_timeout_secs = 30\n",
    ));

    let settings = load_settings_from(&path, env_from(&[])).expect("settings");

    assert_eq!(settings.base_url, "https://triage.example.org");
    assert_eq!(settings.request_timeout, Some(Duration::from_secs(30)));
    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn environment_overrides_file_and_cli_overrides_environment() {
    let (temp_root, path) = temp_settings_path(Some("base_url = \"http://from-file:8000\"\n"));

    let settings = load_settings_from(
        &path,
        env_from(&[
            ("TRIAGE_API_BASE_URL", "http://from-env:8000"),
            ("APP__REQUEST_TIMEOUT_SECS", "15"),
        ]),
    )
    .expect("settings");
    assert_eq!(settings.base_url, "http://from-env:8000");
    assert_eq!(settings.request_timeout, Some(Duration::from_secs(15)));

    let settings = settings.with_overrides(Some("http://from-cli:9000/".into()), Some(0));
    assert_eq!(settings.base_url, "http://from-cli:9000");
    assert_eq!(settings.request_timeout, None);
    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn app_prefixed_variable_wins_over_legacy_name() {
    let (temp_root, path) = temp_settings_path(None);

    let settings = load_settings_from(
        &path,
        env_from(&[
            ("TRIAGE_API_BASE_URL", "http://legacy:8000"),
            ("APP__BASE_URL", "http://app:8000"),
        ]),
    )
    .expect("settings");

    assert_eq!(settings.base_url, "http://app:8000");
    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn ignores_unparseable_timeout() {
    let (temp_root, path) = temp_settings_path(None);

    let settings = load_settings_from(&path, env_from(&[("APP__REQUEST_TIMEOUT_SECS", "soon")]))
        .expect("settings");

    assert_eq!(settings.request_timeout, None);
    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn malformed_settings_file_is_an_error() {
    let (temp_root, path) = temp_settings_path(Some("base_url = [not toml"));

    let err = load_settings_from(&path, env_from(&[])).expect_err("must fail");

    assert!(err.to_string().contains("failed to parse settings file"));
    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn blank_base_url_falls_back_to_default() {
    assert_eq!(normalize_base_url("   "), DEFAULT_BASE_URL);
    assert_eq!(
        normalize_base_url(" http://10.0.0.2:8000// "),
        "http://10.0.0.2:8000"
    );
}

#[test]
fn parse_base_url_requires_http_scheme() {
    assert_eq!(
        parse_base_url("https://triage.example.org/").expect("valid"),
        "https://triage.example.org"
    );
    assert!(parse_base_url("localhost:8000/").is_err());
    assert!(parse_base_url("file:///tmp").is_err());
    assert!(parse_base_url("not a url").is_err());
}
