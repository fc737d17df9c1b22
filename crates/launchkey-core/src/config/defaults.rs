//! Default configuration values

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "launchkey.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "launchkey.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".launchkey.yaml";

/// Android project root relative to the project directory
pub const DEFAULT_ANDROID_DIR: &str = "android";

/// Application module relative to the Android project root
pub const DEFAULT_MODULE_DIR: &str = "app";

/// Keystore properties file relative to the Android project root
pub const DEFAULT_PROPERTIES_FILE: &str = "key.properties";

/// Environment variable for the keystore password
pub const DEFAULT_KEYSTORE_PASSWORD_ENV: &str = "ANDROID_KEYSTORE_PASSWORD";

/// Environment variable for the key password
pub const DEFAULT_KEY_PASSWORD_ENV: &str = "ANDROID_KEY_PASSWORD";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".launchkey.toml",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_names_prefer_visible_yaml() {
        let names = config_file_names();
        assert_eq!(names.first(), Some(&DEFAULT_CONFIG_YAML));
        assert!(names.contains(&".launchkey.toml"));
    }
}
