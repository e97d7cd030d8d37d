use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use url::{form_urlencoded, Url};

pub const DEFAULT_CONFIG_FILE: &str = "staff_console.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub api_prefix: String,
    pub details_page: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            api_prefix: "/api/v1".into(),
            details_page: "/employee-details.html".into(),
        }
    }
}

impl ClientSettings {
    pub fn with_server_url(mut self, server_url: &str) -> Self {
        self.server_url = normalize_server_url(server_url);
        self
    }

    /// Navigation link for one employee's details page.
    pub fn details_href(&self, id: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(id.as_bytes()).collect();
        format!("{}?id={encoded}", self.details_page)
    }

    pub fn parsed_server_url(&self) -> anyhow::Result<Url> {
        Url::parse(&self.server_url)
            .with_context(|| format!("invalid server url '{}'", self.server_url))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    api_prefix: Option<String>,
    details_page: Option<String>,
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicitly named file must exist; the default file is optional.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    let raw = match config_path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };

    if let Some(raw) = raw {
        let file_cfg: FileSettings = toml::from_str(&raw).context("failed to parse config file")?;
        apply_file_settings(&mut settings, file_cfg);
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.parsed_server_url()?;
    Ok(settings)
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = normalize_server_url(&v);
    }
    if let Some(v) = file_cfg.api_prefix {
        settings.api_prefix = normalize_path(&v);
    }
    if let Some(v) = file_cfg.details_page {
        settings.details_page = normalize_path(&v);
    }
}

pub fn apply_env_overrides(settings: &mut ClientSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("EMPLOYEE_API_URL") {
        settings.server_url = normalize_server_url(&v);
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = normalize_server_url(&v);
    }
    if let Some(v) = lookup("APP__API_PREFIX") {
        settings.api_prefix = normalize_path(&v);
    }
    if let Some(v) = lookup("APP__DETAILS_PAGE") {
        settings.details_page = normalize_path(&v);
    }
}

pub fn normalize_server_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return ClientSettings::default().server_url;
    }

    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    with_scheme.trim_end_matches('/').to_string()
}

fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    format!("/{trimmed}")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
