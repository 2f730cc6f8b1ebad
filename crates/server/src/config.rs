use std::{collections::HashMap, fs};

use admin_api::{AdminApiConfig, DEFAULT_API_VERSION};
use anyhow::Context;

pub const SETTINGS_FILE: &str = "gateway.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub shop_url: String,
    pub shop_api_version: String,
    pub shop_access_token: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8787".into(),
            shop_url: "https://example.myshopify.com".into(),
            shop_api_version: DEFAULT_API_VERSION.into(),
            shop_access_token: String::new(),
        }
    }
}

impl Settings {
    pub fn admin_config(&self) -> AdminApiConfig {
        AdminApiConfig {
            shop_url: self.shop_url.clone(),
            api_version: self.shop_api_version.clone(),
            access_token: self.shop_access_token.clone(),
        }
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(SETTINGS_FILE) {
        Ok(raw) => apply_file_overrides(&mut settings, &raw)
            .with_context(|| format!("failed to parse '{SETTINGS_FILE}'"))?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{SETTINGS_FILE}'"));
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub(crate) fn apply_file_overrides(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("shop_url") {
        settings.shop_url = v.clone();
    }
    if let Some(v) = file_cfg.get("api_version") {
        settings.shop_api_version = v.clone();
    }
    if let Some(v) = file_cfg.get("access_token") {
        settings.shop_access_token = v.clone();
    }
    Ok(())
}

/// Later names win, so `APP__*` overrides the short form.
pub(crate) fn apply_env_overrides(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    for key in ["GATEWAY_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = lookup(key) {
            settings.server_bind = v;
        }
    }
    for key in ["SHOP_URL", "APP__SHOP_URL"] {
        if let Some(v) = lookup(key) {
            settings.shop_url = v;
        }
    }
    for key in ["SHOP_API_VERSION", "APP__SHOP_API_VERSION"] {
        if let Some(v) = lookup(key) {
            settings.shop_api_version = v;
        }
    }
    for key in ["SHOP_ACCESS_TOKEN", "APP__SHOP_ACCESS_TOKEN"] {
        if let Some(v) = lookup(key) {
            settings.shop_access_token = v;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
