use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::telemetry::LogFormat;

pub const SETTINGS_FILE: &str = "settings.yaml";

/// Runtime settings for the intake service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ServiceSettings {
    #[serde(default = "default_upload_directory")]
    pub upload_directory: PathBuf,
    /// Where uploads are materialized while a pipeline runs.
    #[serde(default = "std::env::temp_dir")]
    pub temp_directory: PathBuf,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_upload_directory() -> PathBuf {
    PathBuf::from("./uploads")
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            upload_directory: default_upload_directory(),
            temp_directory: std::env::temp_dir(),
            log_format: LogFormat::default(),
        }
    }
}

/// Reads `settings.yaml` from `config_dir`; a missing file yields defaults.
pub fn load_settings<P: AsRef<Path>>(config_dir: P) -> Result<ServiceSettings, ConfigError> {
    let path = config_dir.as_ref().join(SETTINGS_FILE);
    if !path.exists() {
        log::debug!("No {} found, using default settings", SETTINGS_FILE);
        return Ok(ServiceSettings::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
        path: path.clone(),
        source: e,
    })?;
    load_settings_from_str(&content)
}

pub fn load_settings_from_str(content: &str) -> Result<ServiceSettings, ConfigError> {
    if content.trim().is_empty() {
        return Ok(ServiceSettings::default());
    }
    serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
        source_name: SETTINGS_FILE.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings.upload_directory, PathBuf::from("./uploads"));
        assert_eq!(settings.temp_directory, std::env::temp_dir());
        assert_eq!(settings.log_format, LogFormat::Plain);
    }

    #[test]
    fn test_camel_case_fields() {
        let settings = load_settings_from_str(
            "uploadDirectory: /srv/uploads\ntempDirectory: /srv/tmp\nlogFormat: json\n",
        )
        .unwrap();
        assert_eq!(settings.upload_directory, PathBuf::from("/srv/uploads"));
        assert_eq!(settings.temp_directory, PathBuf::from("/srv/tmp"));
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings = load_settings_from_str("tempDirectory: /var/tmp\n").unwrap();
        assert_eq!(settings.upload_directory, PathBuf::from("./uploads"));
        assert_eq!(settings.temp_directory, PathBuf::from("/var/tmp"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            load_settings_from_str("upload_directory: /srv\n"),
            Err(ConfigError::ParseYaml { .. })
        ));
    }
}
