use std::{fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::protocol::{DEFAULT_ORDER, DEFAULT_PAGE_SIZE};

use crate::controller::view_model::{ViewOptions, DEFAULT_FILTER_DEBOUNCE_MS};

pub const DEFAULT_CONFIG_PATH: &str = "cohorts-admin.toml";

/// Extra time allowed on top of the HTTP timeout before giving up on the worker.
const SETTLE_MARGIN: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: Option<String>,
    pub page_size: u32,
    pub default_order: String,
    pub filter_debounce_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            default_order: DEFAULT_ORDER.into(),
            filter_debounce_ms: DEFAULT_FILTER_DEBOUNCE_MS,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    server_url: Option<String>,
    page_size: Option<u32>,
    default_order: Option<String>,
    filter_debounce_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            page_size: self.page_size,
            order: self.default_order.clone(),
            filter_debounce: Duration::from_millis(self.filter_debounce_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn settle_timeout(&self) -> Duration {
        self.request_timeout() + SETTLE_MARGIN
    }

    pub fn set_server_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        let url = url.trim();
        self.server_url = (!url.is_empty()).then(|| url.to_string());
    }

    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.server_url {
            self.set_server_url(v);
        }
        if let Some(v) = file_cfg.page_size {
            self.page_size = v;
        }
        if let Some(v) = file_cfg.default_order {
            self.default_order = v;
        }
        if let Some(v) = file_cfg.filter_debounce_ms {
            self.filter_debounce_ms = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            self.request_timeout_secs = v;
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("COHORTS_SERVER_URL") {
            self.set_server_url(v);
        }
        if let Some(v) = lookup("APP__SERVER_URL") {
            self.set_server_url(v);
        }

        if let Some(v) = lookup("APP__PAGE_SIZE") {
            if let Ok(parsed) = v.parse::<u32>() {
                self.page_size = parsed;
            }
        }

        if let Some(v) = lookup("APP__DEFAULT_ORDER") {
            self.default_order = v;
        }

        if let Some(v) = lookup("APP__FILTER_DEBOUNCE_MS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.filter_debounce_ms = parsed;
            }
        }

        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_secs = parsed;
            }
        }
    }
}

/// Defaults, then the settings file if present, then the environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
            settings.apply_file(file_cfg);
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}
