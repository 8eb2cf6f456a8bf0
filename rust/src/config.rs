//! Configuration loader. Every field has a default so a missing file section
//! still yields a working setup; values that would break drawing or key
//! scoping are rejected up front.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::signature::canvas::Rgba;
use crate::signature::pad::{
    PadConfig, DEFAULT_CANVAS_HEIGHT, DEFAULT_STROKE_WIDTH, MAX_CANVAS_DIMENSION,
};
use crate::signature::theme::Theme;
use crate::storage::secure::DEFAULT_NAMESPACE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file unreadable: {0}")]
    Io(String),
    #[error("config parse failed: {0}")]
    Parse(String),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the key slots.
    pub path: PathBuf,
    /// Prefix of every key slot name.
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("docscan-store.json"),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SignatureConfig {
    pub canvas_height: u32,
    pub stroke_width: f32,
    pub light_pen: String,
    pub dark_pen: String,
    /// `light` or `dark`.
    pub theme: String,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            stroke_width: DEFAULT_STROKE_WIDTH,
            light_pen: "#000000".to_string(),
            dark_pen: "#ffffff".to_string(),
            theme: "light".to_string(),
        }
    }
}

impl SignatureConfig {
    pub fn pad_config(&self) -> Result<PadConfig, ConfigError> {
        if self.canvas_height == 0 || self.canvas_height > MAX_CANVAS_DIMENSION {
            return Err(ConfigError::Invalid(format!(
                "canvasHeight must be between 1 and {MAX_CANVAS_DIMENSION}"
            )));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(ConfigError::Invalid("strokeWidth must be positive".to_string()));
        }
        let light_pen =
            Rgba::parse_hex(&self.light_pen).map_err(|e| ConfigError::Invalid(format!("lightPen: {e}")))?;
        let dark_pen =
            Rgba::parse_hex(&self.dark_pen).map_err(|e| ConfigError::Invalid(format!("darkPen: {e}")))?;
        Ok(PadConfig {
            height: self.canvas_height,
            stroke_width: self.stroke_width,
            light_pen,
            dark_pen,
        })
    }

    pub fn initial_theme(&self) -> Result<Theme, ConfigError> {
        Theme::parse(&self.theme)
            .ok_or_else(|| ConfigError::Invalid(format!("theme must be light or dark, got {}", self.theme)))
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub signature: SignatureConfig,
    pub log_level: Option<String>,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.namespace.is_empty() {
            return Err(ConfigError::Invalid("storage.namespace must not be empty".to_string()));
        }
        self.signature.pad_config()?;
        self.signature.initial_theme()?;
        Ok(())
    }
}

/// Loads and validates the JSON configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let raw_json = fs::read_to_string(&path).map_err(|e| ConfigError::Io(format!("{e}")))?;
    let config: AppConfig =
        serde_json::from_str(&raw_json).map_err(|e| ConfigError::Parse(format!("{e}")))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{load_config, AppConfig, ConfigError};
    use crate::signature::canvas::Rgba;
    use crate::signature::theme::Theme;
    use serde_json::json;
    use std::fs;
    use tempfile::NamedTempFile;

    fn write(payload: serde_json::Value) -> NamedTempFile {
        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), serde_json::to_vec(&payload).unwrap()).unwrap();
        file
    }

    #[test]
    fn loads_full_config() {
        let file = write(json!({
            "storage": { "path": "/tmp/keys.json", "namespace": "scan_" },
            "signature": {
                "canvasHeight": 150,
                "strokeWidth": 3.0,
                "lightPen": "#112233",
                "darkPen": "#eeeeee",
                "theme": "dark"
            },
            "logLevel": "debug"
        }));

        let config = load_config(file.path()).expect("config should load");
        assert_eq!(config.storage.namespace, "scan_");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        let pad = config.signature.pad_config().expect("valid pad config");
        assert_eq!(pad.height, 150);
        assert_eq!(pad.light_pen, Rgba::new(0x11, 0x22, 0x33, 255));
        assert_eq!(config.signature.initial_theme().expect("valid theme"), Theme::Dark);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let file = write(json!({}));
        let config = load_config(file.path()).expect("config should load");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage.namespace, "secure_key_");
    }

    #[test]
    fn rejects_invalid_values() {
        let file = write(json!({ "signature": { "strokeWidth": 0.0 } }));
        assert!(matches!(load_config(file.path()), Err(ConfigError::Invalid(_))));

        let file = write(json!({ "signature": { "canvasHeight": 1_000_000 } }));
        assert!(matches!(load_config(file.path()), Err(ConfigError::Invalid(_))));

        let file = write(json!({ "signature": { "darkPen": "white" } }));
        assert!(matches!(load_config(file.path()), Err(ConfigError::Invalid(_))));

        let file = write(json!({ "storage": { "namespace": "" } }));
        assert!(matches!(load_config(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn reports_parse_errors() {
        let file = NamedTempFile::new().expect("temp file");
        fs::write(file.path(), "{").unwrap();
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }
}
