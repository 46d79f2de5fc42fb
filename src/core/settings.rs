use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Request target, e.g. `http://dev.virtualearth.net/REST/v1/Routes?`.
    pub base_url: String,
    /// Appended as the final `key=` query parameter.
    pub api_key: String,
    /// Each entry becomes one query key/value pair, in map iteration order.
    pub parameters: BTreeMap<String, String>,
    /// Location of the persisted samples; defaults under the user data dir.
    pub store_path: Option<PathBuf>,
    /// Wall-clock spacing between samples.
    pub interval_secs: u64,
    /// Store the entire parsed response instead of the scalar duration.
    pub store_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            parameters: BTreeMap::new(),
            store_path: None,
            interval_secs: DEFAULT_INTERVAL_SECS,
            store_json: false,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("route-sampler").join("config.toml"))
    }

    fn default_store_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("route-sampler").join("samples.json"))
    }

    /// Loads settings from `path`, or from the default config location when
    /// `path` is `None`. A missing default config file is an error here
    /// because there are no usable defaults for `base_url`/`api_key`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path().context("Could not determine config directory")?,
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(path = %path.display(), "Loaded config");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url must be set");
        }
        if self.api_key.is_empty() {
            anyhow::bail!("api_key must be set");
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(p) => Ok(p.clone()),
            None => Self::default_store_path().context("Could not determine data directory"),
        }
    }

    /// Request parameters as an optional-value mapping. TOML cannot express
    /// an absent value, so everything configured is present; callers may
    /// still blank out entries programmatically.
    pub fn request_params(&self) -> BTreeMap<String, Option<String>> {
        self.parameters
            .iter()
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let settings: Settings = toml::from_str(
            r#"
            base_url = "http://dev.virtualearth.net/REST/v1/Routes?"
            api_key = "secret"
            interval_secs = 120
            store_json = true
            store_path = "/tmp/samples.json"

            [parameters]
            "waypoint.1" = "39.345974, -120.161018"
            "waypoint.2" = "37.508873, -105.984524"
            distanceUnit = "mi"
            "#,
        )
        .unwrap();

        assert_eq!(settings.base_url, "http://dev.virtualearth.net/REST/v1/Routes?");
        assert_eq!(settings.interval_secs, 120);
        assert!(settings.store_json);
        assert_eq!(settings.parameters.len(), 3);
        assert_eq!(settings.store_path().unwrap(), PathBuf::from("/tmp/samples.json"));
        settings.validate().unwrap();
    }

    #[test]
    fn test_defaults_applied_for_missing_fields() {
        let settings: Settings = toml::from_str(
            r#"
            base_url = "http://example.com/routes?"
            api_key = "k"
            "#,
        )
        .unwrap();

        assert_eq!(settings.interval_secs, 60);
        assert!(!settings.store_json);
        assert!(settings.parameters.is_empty());
        assert!(settings.store_path.is_none());
    }

    #[test]
    fn test_validate_rejects_missing_key() {
        let settings: Settings = toml::from_str(r#"base_url = "http://example.com/""#).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_request_params_are_all_present() {
        let mut settings = Settings::default();
        settings
            .parameters
            .insert("distanceUnit".to_string(), "mi".to_string());

        let params = settings.request_params();
        assert_eq!(params.get("distanceUnit"), Some(&Some("mi".to_string())));
    }
}
