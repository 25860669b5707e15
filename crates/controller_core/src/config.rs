use std::{fs, path::{Path, PathBuf}, time::Duration};

use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "controller.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub settings_path: PathBuf,
    pub request_timeout: Duration,
    pub search_debounce: Duration,
    pub notification_display: Duration,
    pub notification_exit: Duration,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
            request_timeout: Duration::from_secs(15),
            search_debounce: Duration::from_millis(300),
            notification_display: Duration::from_millis(5000),
            notification_exit: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    settings_path: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    search_debounce_ms: Option<u64>,
    notification_display_ms: Option<u64>,
    notification_exit_ms: Option<u64>,
}

fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("bot_controller"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("credentials.json")
}

/// Defaults, then `config_path` (or `controller.toml` in the working directory), then environment.
pub fn load_settings(config_path: Option<&Path>) -> ControllerSettings {
    let mut settings = ControllerSettings::default();

    let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileConfig>(&raw) {
            Ok(file_cfg) => apply_file_config(&mut settings, file_cfg),
            Err(err) => warn!(path = %path.display(), "ignoring unreadable config file: {err}"),
        }
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings
}

fn apply_file_config(settings: &mut ControllerSettings, file_cfg: FileConfig) {
    if let Some(v) = file_cfg.settings_path {
        settings.settings_path = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(v);
    }
    if let Some(v) = file_cfg.search_debounce_ms {
        settings.search_debounce = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.notification_display_ms {
        settings.notification_display = Duration::from_millis(v);
    }
    if let Some(v) = file_cfg.notification_exit_ms {
        settings.notification_exit = Duration::from_millis(v);
    }
}

fn apply_env_overrides(settings: &mut ControllerSettings, var: impl Fn(&str) -> Option<String>) {
    let lookup = |names: &[&str]| names.iter().rev().find_map(|name| var(name));

    if let Some(v) = lookup(&["BOT_CONTROLLER_SETTINGS_PATH", "APP__SETTINGS_PATH"]) {
        settings.settings_path = PathBuf::from(v);
    }
    if let Some(v) = lookup(&["BOT_CONTROLLER_REQUEST_TIMEOUT_SECS", "APP__REQUEST_TIMEOUT_SECS"]) {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout = Duration::from_secs(parsed);
        }
    }
    if let Some(v) = lookup(&["BOT_CONTROLLER_SEARCH_DEBOUNCE_MS", "APP__SEARCH_DEBOUNCE_MS"]) {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.search_debounce = Duration::from_millis(parsed);
        }
    }
    if let Some(v) = lookup(&[
        "BOT_CONTROLLER_NOTIFICATION_DISPLAY_MS",
        "APP__NOTIFICATION_DISPLAY_MS",
    ]) {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.notification_display = Duration::from_millis(parsed);
        }
    }
    if let Some(v) = lookup(&["BOT_CONTROLLER_NOTIFICATION_EXIT_MS", "APP__NOTIFICATION_EXIT_MS"]) {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.notification_exit = Duration::from_millis(parsed);
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
