//! Launchkey Signing - release signing resolution for Android builds
//!
//! Decides which signing config the `release` build type uses:
//! - a release config built from `key.properties` when it names a keystore
//! - the SDK debug keystore otherwise, with a warning
//!
//! Resolution never fails. Loading problems are logged and turned into a
//! debug fallback, and the chosen config is handed to a [`SigningConfigSink`].

pub mod error;
pub mod identity;
pub mod properties;
pub mod resolver;
pub mod secret;
pub mod sink;

pub use error::{Result, SigningError};
pub use identity::{default_debug_keystore, SigningConfig, SigningConfigKind};
pub use properties::{lookup, KeystoreLookup, KeystoreProperties, Properties};
pub use resolver::{
    FallbackReason, ResolverOptions, SigningResolution, SigningResolver, SigningSource,
    RELEASE_BUILD_TYPE,
};
pub use secret::Secret;
pub use sink::{BuildTypes, GradleInjectedSigning, SigningConfigSink};
