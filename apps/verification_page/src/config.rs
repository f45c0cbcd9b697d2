use std::{fs, path::Path, time::Duration};

use client_core::{websocket_url, ChannelError};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "verification.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub explorer_url: String,
    pub socket_url: Option<String>,
    pub upload_path: String,
    pub heartbeat_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            explorer_url: "http://127.0.0.1:4000".into(),
            socket_url: None,
            upload_path: "/verify_smart_contract/contract_verifications".into(),
            heartbeat_seconds: 30,
        }
    }
}

impl Settings {
    pub fn socket_url(&self) -> Result<String, ChannelError> {
        match &self.socket_url {
            Some(url) => Ok(url.clone()),
            None => websocket_url(&self.explorer_url),
        }
    }

    pub fn upload_endpoint(&self) -> String {
        let base = self.explorer_url.trim_end_matches('/');
        if self.upload_path.starts_with('/') {
            format!("{base}{}", self.upload_path)
        } else {
            format!("{base}/{}", self.upload_path)
        }
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_seconds)
    }
}

/// Defaults, then the optional config file, then environment variables.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        apply_file(&mut settings, &raw);
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    explorer_url: Option<String>,
    socket_url: Option<String>,
    upload_path: Option<String>,
    heartbeat_seconds: Option<u64>,
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<FileConfig>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!("config: ignoring unreadable config file: {err}");
            return;
        }
    };
    if let Some(v) = file_cfg.explorer_url {
        settings.explorer_url = v;
    }
    if file_cfg.socket_url.is_some() {
        settings.socket_url = file_cfg.socket_url;
    }
    if let Some(v) = file_cfg.upload_path {
        settings.upload_path = v;
    }
    if let Some(v) = file_cfg.heartbeat_seconds {
        settings.heartbeat_seconds = v;
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("EXPLORER_URL") {
        settings.explorer_url = v;
    }
    if let Some(v) = var("APP__EXPLORER_URL") {
        settings.explorer_url = v;
    }
    if let Some(v) = var("APP__SOCKET_URL") {
        settings.socket_url = Some(v);
    }
    if let Some(v) = var("APP__UPLOAD_PATH") {
        settings.upload_path = v;
    }
    if let Some(parsed) = var("APP__HEARTBEAT_SECONDS").and_then(|v| v.parse::<u64>().ok()) {
        settings.heartbeat_seconds = parsed;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
