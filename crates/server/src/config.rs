use std::{collections::HashMap, fs};

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:5000".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string("server.toml").ok();
    settings_from_sources(
        file.as_deref(),
        std::env::var("PORT").ok(),
        std::env::var("SERVER_BIND").ok(),
    )
}

/// `server.toml` first, then `PORT`, then `SERVER_BIND`; later sources win.
pub(crate) fn settings_from_sources(
    file: Option<&str>,
    port: Option<String>,
    bind: Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("bind_addr") {
                    settings.server_bind = v.clone();
                }
            }
            Err(err) => warn!(%err, "ignoring malformed server.toml"),
        }
    }

    if let Some(port) = port {
        match port.trim().parse::<u16>() {
            Ok(port) => settings.server_bind = format!("0.0.0.0:{port}"),
            Err(_) => warn!(%port, "ignoring invalid PORT"),
        }
    }

    if let Some(bind) = bind.filter(|v| !v.trim().is_empty()) {
        settings.server_bind = bind.trim().to_string();
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
