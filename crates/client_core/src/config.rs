use std::{fs, io, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shared::protocol::HEALTH_PATH;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/similar";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const SETTINGS_FILE: &str = "art_recommender.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub endpoint: String,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientSettings {
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)
            .with_context(|| format!("invalid endpoint url '{}'", self.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("endpoint must use http or https, got '{}'", url.scheme());
        }
        Ok(url)
    }

    /// Health probe on the same origin as the similarity endpoint.
    pub fn health_url(&self) -> Result<Url> {
        let endpoint = self.endpoint_url()?;
        endpoint
            .join(HEALTH_PATH)
            .with_context(|| format!("cannot derive health url from '{endpoint}'"))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE))
}

/// Defaults, overridden by whichever keys the file provides. Missing or broken
/// files never stop the app from starting.
pub fn load_settings_from(path: &Path) -> ClientSettings {
    let mut settings = ClientSettings::default();

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return settings,
        Err(err) => {
            warn!(path = %path.display(), %err, "failed to read settings file; using defaults");
            return settings;
        }
    };

    match toml::from_str::<SettingsFile>(&raw) {
        Ok(file) => {
            apply_settings_file(&mut settings, file);
            info!(path = %path.display(), endpoint = %settings.endpoint, "loaded client settings");
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "ignoring malformed settings file");
        }
    }

    settings
}

fn apply_settings_file(settings: &mut ClientSettings, file: SettingsFile) {
    if let Some(endpoint) = file.endpoint.map(|v| v.trim().to_string()) {
        let candidate = ClientSettings {
            endpoint: endpoint.clone(),
            ..settings.clone()
        };
        match candidate.endpoint_url() {
            Ok(_) => settings.endpoint = endpoint,
            Err(err) => warn!(%err, "ignoring configured endpoint"),
        }
    }

    match file.request_timeout_secs {
        Some(0) => warn!("request_timeout_secs must be positive; keeping default"),
        Some(secs) => settings.request_timeout = Duration::from_secs(secs),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_settings(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write settings");
        file
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = load_settings_from(&dir.path().join(SETTINGS_FILE));
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.endpoint, "http://localhost:5000/api/similar");
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn file_overrides_endpoint_and_timeout() {
        let file = write_settings(
            "endpoint = \"https://art.example.org/api/similar\"\nrequest_timeout_secs = 5\n",
        );
        let settings = load_settings_from(file.path());
        assert_eq!(settings.endpoint, "https://art.example.org/api/similar");
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn malformed_file_is_ignored() {
        let file = write_settings("endpoint = [not toml");
        assert_eq!(load_settings_from(file.path()), ClientSettings::default());
    }

    #[test]
    fn unknown_keys_are_rejected_as_a_whole() {
        let file = write_settings("endpoint = \"http://other:5000/api/similar\"\nretries = 3\n");
        assert_eq!(load_settings_from(file.path()), ClientSettings::default());
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let file = write_settings("endpoint = \"ftp://host/api\"\nrequest_timeout_secs = 0\n");
        assert_eq!(load_settings_from(file.path()), ClientSettings::default());
    }

    #[test]
    fn health_url_shares_endpoint_origin() {
        let settings = ClientSettings {
            endpoint: "http://127.0.0.1:5000/api/similar".to_string(),
            ..ClientSettings::default()
        };
        assert_eq!(
            settings.health_url().expect("health url").as_str(),
            "http://127.0.0.1:5000/health"
        );
    }
}
