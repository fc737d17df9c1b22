//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_paths(config)?;
    validate_env_names(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_paths(config: &Config) -> Result<()> {
    let signing = &config.signing;

    if signing.properties_file.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "signing.properties_file".to_string(),
            message: "properties file cannot be empty".to_string(),
        }
        .into());
    }

    if signing.module_dir.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "signing.module_dir".to_string(),
            message: "module directory cannot be empty".to_string(),
        }
        .into());
    }

    if let Some(debug_keystore) = &signing.debug_keystore {
        if debug_keystore.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "signing.debug_keystore".to_string(),
                message: "debug keystore path cannot be empty when set".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_env_names(config: &Config) -> Result<()> {
    let fields = [
        ("signing.keystore_password_env", &config.signing.keystore_password_env),
        ("signing.key_password_env", &config.signing.key_password_env),
    ];

    for (field, name) in fields {
        if name.is_empty() || name.contains('=') || name.contains('\0') {
            return Err(ConfigError::InvalidValue {
                field: field.to_string(),
                message: "must be a non-empty environment variable name without '='".to_string(),
            }
            .into());
        }
    }

    Ok(())
}
