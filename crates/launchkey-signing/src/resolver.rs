//! Release signing config resolution with debug fallback
//!
//! The release build type always ends up with a signing config. When the
//! keystore properties file is missing, unreadable, or lacks `storeFile`, the
//! SDK debug keystore is assigned instead and a warning is logged. Nothing in
//! this module returns an error.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::identity::{default_debug_keystore, SigningConfig};
use crate::properties::{self, KeystoreLookup, KeystoreProperties};
use crate::secret::Secret;
use crate::sink::SigningConfigSink;

/// Name of the build type the resolver assigns to
pub const RELEASE_BUILD_TYPE: &str = "release";

/// Why the release build type fell back to debug signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No properties file on disk
    PropertiesMissing,
    /// The properties file exists but failed to load
    PropertiesUnreadable(String),
    /// The properties file has no usable `storeFile`
    StoreFileMissing,
}

impl FallbackReason {
    /// Stable identifier used in JSON output
    pub fn code(&self) -> &'static str {
        match self {
            Self::PropertiesMissing => "properties_missing",
            Self::PropertiesUnreadable(_) => "properties_unreadable",
            Self::StoreFileMissing => "store_file_missing",
        }
    }
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PropertiesMissing => write!(f, "keystore properties file not found"),
            Self::PropertiesUnreadable(reason) => {
                write!(f, "keystore properties could not be loaded: {}", reason)
            }
            Self::StoreFileMissing => write!(f, "storeFile is not set in keystore properties"),
        }
    }
}

/// Where the assigned signing config came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningSource {
    Release,
    DebugFallback(FallbackReason),
}

impl std::fmt::Display for SigningSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Release => write!(f, "release"),
            Self::DebugFallback(_) => write!(f, "debug_fallback"),
        }
    }
}

/// Result of a resolution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningResolution {
    /// Build type the config was assigned to
    pub build_type: String,
    pub config: SigningConfig,
    pub source: SigningSource,
    /// Non-fatal problems noticed while resolving
    pub warnings: Vec<String>,
}

impl SigningResolution {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, SigningSource::DebugFallback(_))
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match &self.source {
            SigningSource::DebugFallback(reason) => Some(reason),
            SigningSource::Release => None,
        }
    }
}

/// Resolver settings
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Directory relative `storeFile` values are resolved against
    pub module_dir: PathBuf,

    /// Keystore backing the debug fallback
    pub debug_keystore: PathBuf,

    /// Environment variable consulted when `storePassword` is missing
    pub keystore_password_env: Option<String>,

    /// Environment variable consulted when `keyPassword` is missing
    pub key_password_env: Option<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            module_dir: PathBuf::from("."),
            debug_keystore: default_debug_keystore(),
            keystore_password_env: Some("ANDROID_KEYSTORE_PASSWORD".to_string()),
            key_password_env: Some("ANDROID_KEY_PASSWORD".to_string()),
        }
    }
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Chooses the signing config for the release build type
pub struct SigningResolver {
    options: ResolverOptions,
    env: EnvLookup,
}

impl SigningResolver {
    /// Create a resolver that reads password fallbacks from the process environment
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            options,
            env: Box::new(|name| std::env::var(name).ok()),
        }
    }

    /// Replace the environment lookup
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Resolve from an already loaded record.
    ///
    /// `properties` is `None` when the file was absent or failed to load;
    /// `file_exists` tells the two apart.
    pub fn resolve(
        &self,
        properties: Option<&KeystoreProperties>,
        file_exists: bool,
        sink: &mut dyn SigningConfigSink,
    ) -> SigningResolution {
        let loaded = match (file_exists, properties) {
            (false, _) => Err(FallbackReason::PropertiesMissing),
            (true, None) => Err(FallbackReason::PropertiesUnreadable(
                "failed to load".to_string(),
            )),
            (true, Some(properties)) => Ok(properties),
        };
        self.assign(loaded, sink)
    }

    /// Resolve from the outcome of [`properties::lookup`]
    pub fn resolve_lookup(
        &self,
        lookup: &KeystoreLookup,
        sink: &mut dyn SigningConfigSink,
    ) -> SigningResolution {
        let loaded = match lookup {
            KeystoreLookup::Missing { .. } => Err(FallbackReason::PropertiesMissing),
            KeystoreLookup::Unreadable { reason, .. } => {
                Err(FallbackReason::PropertiesUnreadable(reason.clone()))
            }
            KeystoreLookup::Loaded { properties, .. } => Ok(properties),
        };
        self.assign(loaded, sink)
    }

    /// Look up the properties file at `path` and resolve
    pub fn resolve_file(&self, path: &Path, sink: &mut dyn SigningConfigSink) -> SigningResolution {
        debug!(path = %path.display(), "resolving release signing config");
        self.resolve_lookup(&properties::lookup(path), sink)
    }

    fn assign(
        &self,
        loaded: Result<&KeystoreProperties, FallbackReason>,
        sink: &mut dyn SigningConfigSink,
    ) -> SigningResolution {
        let release = loaded.and_then(|props| {
            SigningConfig::release(props, &self.options.module_dir)
                .ok_or(FallbackReason::StoreFileMissing)
        });

        let resolution = match release {
            Ok(config) => self.release_resolution(config),
            Err(reason) => self.fallback_resolution(reason),
        };

        sink.assign(&resolution.build_type, &resolution.config);
        resolution
    }

    fn release_resolution(&self, mut config: SigningConfig) -> SigningResolution {
        fill_from_env(
            &mut config.store_password,
            self.options.keystore_password_env.as_deref(),
            &self.env,
        );
        fill_from_env(
            &mut config.key_password,
            self.options.key_password_env.as_deref(),
            &self.env,
        );

        let mut warnings: Vec<String> = config
            .missing_fields()
            .into_iter()
            .map(|field| format!("{} is not set for the release signing config", field))
            .collect();

        if !config.store_file.exists() {
            warnings.push(format!(
                "keystore file {} does not exist",
                config.store_file.display()
            ));
        }

        info!(
            store_file = %config.store_file.display(),
            key_alias = config.key_alias.as_deref().unwrap_or(""),
            "Using release signing configuration"
        );
        for warning in &warnings {
            warn!("{}", warning);
        }

        SigningResolution {
            build_type: RELEASE_BUILD_TYPE.to_string(),
            config,
            source: SigningSource::Release,
            warnings,
        }
    }

    fn fallback_resolution(&self, reason: FallbackReason) -> SigningResolution {
        warn!(
            reason = %reason,
            "Release signing config not found, falling back to debug signing for release build type"
        );

        let config = SigningConfig::debug(self.options.debug_keystore.clone());
        let warnings = vec![format!(
            "{}; release build type uses debug signing",
            reason
        )];

        SigningResolution {
            build_type: RELEASE_BUILD_TYPE.to_string(),
            config,
            source: SigningSource::DebugFallback(reason),
            warnings,
        }
    }
}

impl Default for SigningResolver {
    fn default() -> Self {
        Self::new(ResolverOptions::default())
    }
}

/// Fill an empty password from an environment variable; file values win
fn fill_from_env(slot: &mut Option<Secret>, var: Option<&str>, env: &EnvLookup) {
    if slot.as_ref().is_some_and(|s| !s.is_empty()) {
        return;
    }
    if let Some(value) = var.and_then(|name| env(name)) {
        debug!(env = var.unwrap_or(""), "password taken from environment");
        *slot = Some(Secret::new(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SigningConfigKind;
    use crate::sink::BuildTypes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Counts `WARN` events
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings(f: impl FnOnce()) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(count.clone()));
        tracing::subscriber::with_default(subscriber, f);
        count.load(Ordering::SeqCst)
    }

    const FULL: &str = "\
storePassword=store-pass
keyPassword=key-pass
keyAlias=upload
storeFile=upload-keystore.jks
";

    fn resolver(temp: &TempDir) -> SigningResolver {
        SigningResolver::new(ResolverOptions {
            module_dir: temp.path().join("app"),
            debug_keystore: temp.path().join("debug.keystore"),
            keystore_password_env: Some("LK_TEST_STORE_PASS".to_string()),
            key_password_env: Some("LK_TEST_KEY_PASS".to_string()),
        })
        .with_env_lookup(|_| None)
    }

    fn assert_debug_fallback(resolution: &SigningResolution, build_types: &BuildTypes) {
        assert!(resolution.is_fallback());
        assert_eq!(resolution.config.kind, SigningConfigKind::Debug);
        assert!(!resolution.warnings.is_empty());
        assert_eq!(build_types.get("release"), Some(&resolution.config));
    }

    #[test]
    fn test_missing_file_falls_back_to_debug() {
        let temp = TempDir::new().unwrap();
        let mut build_types = BuildTypes::new();

        let resolution =
            resolver(&temp).resolve_file(&temp.path().join("key.properties"), &mut build_types);

        assert_debug_fallback(&resolution, &build_types);
        assert_eq!(
            resolution.fallback_reason(),
            Some(&FallbackReason::PropertiesMissing)
        );
        assert_eq!(resolution.config.store_file, temp.path().join("debug.keystore"));
    }

    #[test]
    fn test_complete_file_uses_release() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("key.properties");
        std::fs::write(&path, FULL).unwrap();
        std::fs::create_dir_all(temp.path().join("app")).unwrap();
        std::fs::write(temp.path().join("app").join("upload-keystore.jks"), b"jks").unwrap();
        let mut build_types = BuildTypes::new();

        let resolution = resolver(&temp).resolve_file(&path, &mut build_types);

        assert_eq!(resolution.source, SigningSource::Release);
        assert!(resolution.warnings.is_empty());
        let config = build_types.get("release").unwrap();
        assert_eq!(config.kind, SigningConfigKind::Release);
        assert_eq!(config.key_alias.as_deref(), Some("upload"));
        assert_eq!(config.key_password.as_ref().unwrap().expose(), "key-pass");
        assert_eq!(config.store_password.as_ref().unwrap().expose(), "store-pass");
        assert_eq!(
            config.store_file,
            temp.path().join("app").join("upload-keystore.jks")
        );
    }

    #[test]
    fn test_empty_file_falls_back_to_debug() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("key.properties");
        std::fs::write(&path, "").unwrap();
        let mut build_types = BuildTypes::new();

        let resolution = resolver(&temp).resolve_file(&path, &mut build_types);

        assert_debug_fallback(&resolution, &build_types);
        assert_eq!(
            resolution.fallback_reason(),
            Some(&FallbackReason::StoreFileMissing)
        );
    }

    #[test]
    fn test_corrupt_file_falls_back_to_debug() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("key.properties");
        std::fs::write(&path, b"storeFile=\xc3\x28upload.jks\n").unwrap();
        let mut build_types = BuildTypes::new();

        let resolution = resolver(&temp).resolve_file(&path, &mut build_types);

        assert_debug_fallback(&resolution, &build_types);
        assert!(matches!(
            resolution.fallback_reason(),
            Some(FallbackReason::PropertiesUnreadable(_))
        ));
    }

    #[test]
    fn test_properties_without_file_fall_back() {
        let temp = TempDir::new().unwrap();
        let props = KeystoreProperties::parse(FULL).unwrap();
        let mut build_types = BuildTypes::new();

        let resolution = resolver(&temp).resolve(Some(&props), false, &mut build_types);

        assert_debug_fallback(&resolution, &build_types);
        assert_eq!(
            resolution.fallback_reason(),
            Some(&FallbackReason::PropertiesMissing)
        );
    }

    #[test]
    fn test_existing_file_without_record_is_unreadable() {
        let temp = TempDir::new().unwrap();
        let mut build_types = BuildTypes::new();

        let resolution = resolver(&temp).resolve(None, true, &mut build_types);

        assert_debug_fallback(&resolution, &build_types);
        assert_eq!(resolution.fallback_reason().unwrap().code(), "properties_unreadable");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("key.properties");
        std::fs::write(&path, FULL).unwrap();
        let resolver = resolver(&temp);

        let mut first_sink = BuildTypes::new();
        let mut second_sink = BuildTypes::new();
        let first = resolver.resolve_file(&path, &mut first_sink);
        let second = resolver.resolve_file(&path, &mut second_sink);

        assert_eq!(first, second);
        assert_eq!(first_sink.get("release"), second_sink.get("release"));
    }

    #[test]
    fn test_missing_passwords_come_from_env() {
        let temp = TempDir::new().unwrap();
        let props = KeystoreProperties::parse("storeFile=/keys/upload.jks\nkeyAlias=upload\n").unwrap();
        let resolver = resolver(&temp).with_env_lookup(|name| match name {
            "LK_TEST_STORE_PASS" => Some("env-store".to_string()),
            "LK_TEST_KEY_PASS" => Some("env-key".to_string()),
            _ => None,
        });
        let mut build_types = BuildTypes::new();

        let resolution = resolver.resolve(Some(&props), true, &mut build_types);

        assert_eq!(resolution.source, SigningSource::Release);
        assert_eq!(
            resolution.config.store_password.as_ref().unwrap().expose(),
            "env-store"
        );
        assert_eq!(resolution.config.key_password.as_ref().unwrap().expose(), "env-key");
    }

    #[test]
    fn test_file_passwords_win_over_env() {
        let temp = TempDir::new().unwrap();
        let props = KeystoreProperties::parse(FULL).unwrap();
        let resolver = resolver(&temp).with_env_lookup(|_| Some("from-env".to_string()));
        let mut build_types = BuildTypes::new();

        let resolution = resolver.resolve(Some(&props), true, &mut build_types);

        assert_eq!(
            resolution.config.store_password.as_ref().unwrap().expose(),
            "store-pass"
        );
        assert_eq!(resolution.config.key_password.as_ref().unwrap().expose(), "key-pass");
    }

    #[test]
    fn test_partial_release_record_warns_but_keeps_release() {
        let temp = TempDir::new().unwrap();
        let props = KeystoreProperties::parse("storeFile=/nowhere/upload.jks\n").unwrap();
        let mut build_types = BuildTypes::new();

        let resolution = resolver(&temp).resolve(Some(&props), true, &mut build_types);

        assert_eq!(resolution.source, SigningSource::Release);
        assert!(resolution
            .warnings
            .iter()
            .any(|w| w.starts_with("keyAlias is not set")));
        assert!(resolution
            .warnings
            .iter()
            .any(|w| w.contains("does not exist")));
    }

    #[test]
    fn test_missing_file_warns_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("key.properties");

        let warnings = count_warnings(|| {
            resolver(&temp).resolve_file(&path, &mut BuildTypes::new());
        });
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_unreadable_file_warns_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("key.properties");
        std::fs::write(&path, "storeFile=\\uZZZZ\n").unwrap();

        let warnings = count_warnings(|| {
            resolver(&temp).resolve_file(&path, &mut BuildTypes::new());
        });
        assert_eq!(warnings, 1);
    }
}
