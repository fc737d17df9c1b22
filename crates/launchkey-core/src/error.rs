//! Error types for launchkey

use thiserror::Error;

/// Result type alias using LaunchkeyError
pub type Result<T> = std::result::Result<T, LaunchkeyError>;

/// Main error type for launchkey operations
#[derive(Debug, Error)]
pub enum LaunchkeyError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err: LaunchkeyError = ConfigError::InvalidValue {
            field: "signing.properties_file".to_string(),
            message: "cannot be empty".to_string(),
        }
        .into();

        assert!(matches!(err, LaunchkeyError::Config(ConfigError::InvalidValue { .. })));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: signing.properties_file - cannot be empty"
        );
    }

    #[test]
    fn test_parse_error_is_config_error() {
        let yaml_err = serde_yaml::from_str::<u32>("not a number").unwrap_err();
        let err: LaunchkeyError = ConfigError::from(yaml_err).into();

        assert!(matches!(err, LaunchkeyError::Config(ConfigError::YamlError(_))));
        assert!(err.to_string().starts_with("YAML parsing error"));
    }
}
