//! Build-type sinks that receive resolved signing configs
//!
//! The build tool owns its build types; the resolver only hands a finished
//! [`SigningConfig`] to whatever implements [`SigningConfigSink`].

use std::collections::BTreeMap;

use tracing::debug;

use crate::identity::SigningConfig;
use crate::secret::Secret;

/// Gradle property carrying the keystore path
pub const INJECTED_STORE_FILE: &str = "android.injected.signing.store.file";
/// Gradle property carrying the keystore password
pub const INJECTED_STORE_PASSWORD: &str = "android.injected.signing.store.password";
/// Gradle property carrying the key alias
pub const INJECTED_KEY_ALIAS: &str = "android.injected.signing.key.alias";
/// Gradle property carrying the key password
pub const INJECTED_KEY_PASSWORD: &str = "android.injected.signing.key.password";

/// Receives the signing config chosen for a build type
pub trait SigningConfigSink {
    fn assign(&mut self, build_type: &str, config: &SigningConfig);
}

/// In-memory build types with their assigned signing configs
#[derive(Debug, Clone, Default)]
pub struct BuildTypes {
    assignments: BTreeMap<String, SigningConfig>,
}

impl BuildTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signing config assigned to a build type
    pub fn get(&self, build_type: &str) -> Option<&SigningConfig> {
        self.assignments.get(build_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SigningConfig)> {
        self.assignments.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl SigningConfigSink for BuildTypes {
    fn assign(&mut self, build_type: &str, config: &SigningConfig) {
        debug!(build_type, signing_config = config.name(), "assigning signing config");
        self.assignments.insert(build_type.to_string(), config.clone());
    }
}

/// Renders an assignment as Android Gradle Plugin injected signing properties.
///
/// Only assignments for the watched build type are recorded; the result can be
/// appended to `./gradlew assemble<BuildType>`.
#[derive(Debug, Clone)]
pub struct GradleInjectedSigning {
    build_type: String,
    properties: Vec<(&'static str, InjectedValue)>,
}

#[derive(Debug, Clone)]
enum InjectedValue {
    Plain(String),
    Secret(Secret),
}

impl GradleInjectedSigning {
    /// Watch assignments for `build_type`
    pub fn new(build_type: impl Into<String>) -> Self {
        Self {
            build_type: build_type.into(),
            properties: Vec::new(),
        }
    }

    /// Whether an assignment for the watched build type has been received
    pub fn is_assigned(&self) -> bool {
        !self.properties.is_empty()
    }

    /// `-Pname=value` arguments with raw passwords
    pub fn args(&self) -> Vec<String> {
        self.properties
            .iter()
            .map(|(name, value)| match value {
                InjectedValue::Plain(v) => format!("-P{}={}", name, v),
                InjectedValue::Secret(v) => format!("-P{}={}", name, v.expose()),
            })
            .collect()
    }

    /// `-Pname=value` arguments with passwords redacted, for display
    pub fn redacted_args(&self) -> Vec<String> {
        self.properties
            .iter()
            .map(|(name, value)| match value {
                InjectedValue::Plain(v) => format!("-P{}={}", name, v),
                InjectedValue::Secret(v) => format!("-P{}={}", name, v),
            })
            .collect()
    }
}

impl SigningConfigSink for GradleInjectedSigning {
    fn assign(&mut self, build_type: &str, config: &SigningConfig) {
        if build_type != self.build_type {
            return;
        }

        let mut properties = vec![(
            INJECTED_STORE_FILE,
            InjectedValue::Plain(config.store_file.to_string_lossy().to_string()),
        )];
        if let Some(password) = &config.store_password {
            properties.push((INJECTED_STORE_PASSWORD, InjectedValue::Secret(password.clone())));
        }
        if let Some(alias) = &config.key_alias {
            properties.push((INJECTED_KEY_ALIAS, InjectedValue::Plain(alias.clone())));
        }
        if let Some(password) = &config.key_password {
            properties.push((INJECTED_KEY_PASSWORD, InjectedValue::Secret(password.clone())));
        }

        self.properties = properties;
    }
}
