use std::{fs, time::Duration};

use serde::Deserialize;
use shared::protocol::{analyze_url, DEFAULT_BACKEND_URL};
use tracing::warn;
use url::Url;

pub const SETTINGS_FILE: &str = "facemaxx.toml";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: String,
    pub request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    backend_url: Option<String>,
    request_timeout_seconds: Option<u64>,
}

impl Settings {
    pub fn analyze_url(&self) -> String {
        analyze_url(&self.backend_url)
    }

    /// Replaces the backend URL when `raw` is an absolute http(s) URL.
    pub fn set_backend_url(&mut self, raw: &str) -> Result<(), InvalidBackendUrl> {
        let raw = raw.trim();
        let parsed = Url::parse(raw).map_err(|e| InvalidBackendUrl {
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(InvalidBackendUrl {
                value: raw.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        self.backend_url = raw.to_string();
        Ok(())
    }

    pub fn set_request_timeout_seconds(&mut self, seconds: u64) {
        if seconds == 0 {
            warn!("settings: ignoring zero request timeout");
            return;
        }
        self.request_timeout = Duration::from_secs(seconds);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid backend url '{value}': {reason}")]
pub struct InvalidBackendUrl {
    pub value: String,
    pub reason: String,
}

/// Resolves settings once at startup from `facemaxx.toml` and the process
/// environment.
pub fn load_settings() -> Settings {
    let raw = fs::read_to_string(SETTINGS_FILE).ok();
    load_settings_from(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Layering: defaults, then the settings file, then `BACKEND_URL`,
/// `APP__BACKEND_URL` and `APP__REQUEST_TIMEOUT_SECONDS`.
pub fn load_settings_from(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.backend_url {
                    apply_backend_url(&mut settings, &v, SETTINGS_FILE);
                }
                if let Some(v) = file_cfg.request_timeout_seconds {
                    settings.set_request_timeout_seconds(v);
                }
            }
            Err(error) => {
                warn!(%error, file = SETTINGS_FILE, "settings: ignoring unreadable file")
            }
        }
    }

    for key in ["BACKEND_URL", "APP__BACKEND_URL"] {
        if let Some(v) = env(key) {
            apply_backend_url(&mut settings, &v, key);
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECONDS") {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.set_request_timeout_seconds(parsed),
            Err(_) => warn!(
                value = %v,
                "settings: ignoring invalid APP__REQUEST_TIMEOUT_SECONDS"
            ),
        }
    }

    settings
}

fn apply_backend_url(settings: &mut Settings, raw: &str, source: &str) {
    if raw.trim().is_empty() {
        return;
    }
    if let Err(error) = settings.set_backend_url(raw) {
        warn!(%error, source, "settings: keeping previous backend url");
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
