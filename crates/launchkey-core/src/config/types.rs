//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::defaults::{
    DEFAULT_ANDROID_DIR, DEFAULT_KEYSTORE_PASSWORD_ENV, DEFAULT_KEY_PASSWORD_ENV,
    DEFAULT_MODULE_DIR, DEFAULT_PROPERTIES_FILE,
};

/// Main configuration for launchkey
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Release signing configuration
    pub signing: SigningSettings,
}

/// Where release signing credentials come from and what to fall back to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningSettings {
    /// Android project root, relative to the project directory
    pub android_dir: PathBuf,

    /// Application module directory, relative to `android_dir`.
    /// Relative `storeFile` values are resolved against this directory.
    pub module_dir: PathBuf,

    /// Keystore properties file, relative to `android_dir`
    pub properties_file: PathBuf,

    /// Debug keystore used for fallback signing (defaults to the SDK keystore)
    pub debug_keystore: Option<PathBuf>,

    /// Environment variable consulted when `storePassword` is missing
    pub keystore_password_env: String,

    /// Environment variable consulted when `keyPassword` is missing
    pub key_password_env: String,

    /// Treat a debug fallback as a failure in `launchkey check`
    pub require_release: bool,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            android_dir: PathBuf::from(DEFAULT_ANDROID_DIR),
            module_dir: PathBuf::from(DEFAULT_MODULE_DIR),
            properties_file: PathBuf::from(DEFAULT_PROPERTIES_FILE),
            debug_keystore: None,
            keystore_password_env: DEFAULT_KEYSTORE_PASSWORD_ENV.to_string(),
            key_password_env: DEFAULT_KEY_PASSWORD_ENV.to_string(),
            require_release: false,
        }
    }
}

impl SigningSettings {
    /// Absolute Android project root for a project directory
    pub fn android_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.android_dir)
    }

    /// Path of the keystore properties file for a project directory
    pub fn properties_path(&self, project_dir: &Path) -> PathBuf {
        self.android_path(project_dir).join(&self.properties_file)
    }

    /// Directory that relative `storeFile` values are resolved against
    pub fn module_path(&self, project_dir: &Path) -> PathBuf {
        self.android_path(project_dir).join(&self.module_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let settings = SigningSettings::default();
        let root = Path::new("/work/app");

        assert_eq!(
            settings.properties_path(root),
            PathBuf::from("/work/app/android/key.properties")
        );
        assert_eq!(
            settings.module_path(root),
            PathBuf::from("/work/app/android/app")
        );
    }

    #[test]
    fn test_absolute_properties_file_wins() {
        let settings = SigningSettings {
            properties_file: PathBuf::from("/secrets/key.properties"),
            ..Default::default()
        };

        assert_eq!(
            settings.properties_path(Path::new("/work/app")),
            PathBuf::from("/secrets/key.properties")
        );
    }
}
