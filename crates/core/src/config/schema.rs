//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub signing: SigningConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// General project configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Android project directory (the Gradle root project)
    #[serde(default = "default_project_dir")]
    pub project_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
        }
    }
}

fn default_project_dir() -> String {
    "android".to_string()
}

/// Release signing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SigningConfig {
    /// Secrets file name, relative to the project directory
    #[serde(default = "default_secrets_file")]
    pub secrets_file: String,

    /// Treat a missing `storeFile` entry as an error
    #[serde(default = "default_true")]
    pub require_store_file: bool,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            secrets_file: default_secrets_file(),
            require_store_file: true,
        }
    }
}

fn default_secrets_file() -> String {
    "key.properties".to_string()
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let schema = ConfigSchema::default();
        assert_eq!(schema.general.project_dir, "android");
        assert_eq!(schema.signing.secrets_file, "key.properties");
        assert!(schema.signing.require_store_file);
        assert_eq!(schema.logging.level, "warn");
    }

    #[test]
    fn test_partial_section_keeps_field_defaults() {
        let schema: ConfigSchema = toml::from_str(
            r#"
            [signing]
            require_store_file = false
            "#,
        )
        .unwrap();

        assert!(!schema.signing.require_store_file);
        assert_eq!(schema.signing.secrets_file, "key.properties");
        assert_eq!(schema.general, GeneralConfig::default());
    }
}
