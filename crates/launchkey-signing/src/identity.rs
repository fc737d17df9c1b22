//! Signing config types

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::properties::KeystoreProperties;
use crate::secret::Secret;

/// Alias of the key in the Android SDK debug keystore
pub const DEBUG_KEY_ALIAS: &str = "androiddebugkey";

/// Store and key password of the Android SDK debug keystore
pub const DEBUG_PASSWORD: &str = "android";

/// Which signing config a build type ended up with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningConfigKind {
    /// Built from the keystore properties file
    Release,
    /// The SDK debug keystore
    Debug,
}

impl SigningConfigKind {
    /// Gradle name of the signing config
    pub fn name(&self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Debug => "debug",
        }
    }
}

impl std::fmt::Display for SigningConfigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A signing config: keystore, key alias and the two passwords.
///
/// Passwords are [`Secret`]s, so `Debug`, `Display` and JSON output never
/// reveal them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SigningConfig {
    pub kind: SigningConfigKind,

    /// Keystore file, absolute once resolved
    pub store_file: PathBuf,

    pub store_password: Option<Secret>,

    pub key_alias: Option<String>,

    pub key_password: Option<Secret>,
}

impl SigningConfig {
    /// The SDK debug signing config backed by `keystore`
    pub fn debug(keystore: impl Into<PathBuf>) -> Self {
        Self {
            kind: SigningConfigKind::Debug,
            store_file: keystore.into(),
            store_password: Some(Secret::from(DEBUG_PASSWORD)),
            key_alias: Some(DEBUG_KEY_ALIAS.to_string()),
            key_password: Some(Secret::from(DEBUG_PASSWORD)),
        }
    }

    /// A release signing config from keystore properties.
    ///
    /// Returns `None` when the record has no usable `storeFile`. A relative
    /// `storeFile` is resolved against `module_dir`.
    pub fn release(properties: &KeystoreProperties, module_dir: &Path) -> Option<Self> {
        let store_file = properties.store_file()?;
        Some(Self {
            kind: SigningConfigKind::Release,
            store_file: resolve_store_file(store_file, module_dir),
            store_password: properties.store_password.clone(),
            key_alias: properties.key_alias.clone(),
            key_password: properties.key_password.clone(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_release(&self) -> bool {
        self.kind == SigningConfigKind::Release
    }

    /// Property keys that are missing or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.key_alias.as_deref().map_or(true, str::is_empty) {
            missing.push(crate::properties::KEY_ALIAS);
        }
        if self.key_password.as_ref().map_or(true, Secret::is_empty) {
            missing.push(crate::properties::KEY_PASSWORD);
        }
        if self.store_password.as_ref().map_or(true, Secret::is_empty) {
            missing.push(crate::properties::STORE_PASSWORD);
        }
        missing
    }

    /// Whether all four fields are present
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Get a display string for the config (useful for UI)
    pub fn display_name(&self) -> String {
        match &self.key_alias {
            Some(alias) => format!("{} ({})", alias, self.store_file.display()),
            None => self.store_file.display().to_string(),
        }
    }
}

impl std::fmt::Display for SigningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.display_name(), self.kind)
    }
}

/// Default location of the SDK debug keystore (`~/.android/debug.keystore`)
pub fn default_debug_keystore() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".android")
        .join("debug.keystore")
}

/// Resolve a `storeFile` value the way Gradle's `file()` does, plus `~/`
pub fn resolve_store_file(store_file: &str, module_dir: &Path) -> PathBuf {
    if let Some(rest) = store_file.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }

    let path = Path::new(store_file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        module_dir.join(path)
    }
}
