use anyhow::Context;
use muni_common::models::auth::LoginType;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_storage_path() -> String {
    ".muni/session.json".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_debounce_ms() -> u64 {
    500
}

/// Client configuration - loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Gateway URL; service paths (`/api/auth`, ...) are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// File that keeps the session between runs
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Quiet period before an availability check is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default)]
    pub default_login_type: LoginType,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            storage_path: default_storage_path(),
            request_timeout_secs: default_request_timeout(),
            debounce_ms: default_debounce_ms(),
            default_login_type: LoginType::default(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn build(path: &str, required: bool) -> anyhow::Result<ClientConfig> {
    let config: ClientConfig = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Yaml).required(required))
        .add_source(
            config::Environment::with_prefix("MUNI")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .context(format!("Failed to load client config: {}", path))?
        .try_deserialize()
        .context("Failed to parse client config")?;
    Ok(config)
}

/// Load client config from a YAML file with MUNI__ env var overrides.
pub fn load_config(path: &str) -> anyhow::Result<ClientConfig> {
    build(path, true)
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_config_or_default(path: &str) -> anyhow::Result<ClientConfig> {
    build(path, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_config() {
        let file = yaml_file(
            r#"
base_url: "https://muni.example.cl"
storage_path: "/tmp/muni-session.json"
request_timeout_secs: 10
debounce_ms: 250
default_login_type: rut
"#,
        );

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.base_url, "https://muni.example.cl");
        assert_eq!(config.storage_path, "/tmp/muni-session.json");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.default_login_type, LoginType::Rut);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let file = yaml_file("base_url: \"http://gateway:8000\"\n");

        let config = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.base_url, "http://gateway:8000");
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.default_login_type, LoginType::Email);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");
        let path = path.to_str().unwrap();

        assert!(load_config(path).is_err());
        let config = load_config_or_default(path).unwrap();
        assert_eq!(config.base_url, ClientConfig::default().base_url);
    }

    #[test]
    fn test_invalid_value_is_rejected() {
        let file = yaml_file("debounce_ms: \"soon\"\n");
        assert!(load_config(file.path().to_str().unwrap()).is_err());
    }
}
