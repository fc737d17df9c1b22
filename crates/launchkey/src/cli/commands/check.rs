//! Check command - verify that release signing is available

use clap::Args;
use thiserror::Error;
use tracing::info;

use launchkey_signing::{BuildTypes, SigningResolution};

use crate::cli::{output, Cli, OutputFormat};

use super::resolve::resolution_json;
use super::SigningArgs;

/// Returned when release signing is required but the check did not pass
#[derive(Debug, Error)]
#[error("Release signing check failed: {0}")]
pub struct CheckFailed(pub String);

/// Fail when release signing is required but unavailable
#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub signing: SigningArgs,

    /// Treat a debug fallback as a failure (also `signing.require_release`)
    #[arg(long)]
    pub require_release: bool,

    /// Treat warnings about an incomplete release config as failures
    #[arg(long)]
    pub strict: bool,
}

impl CheckCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            require_release = self.require_release,
            strict = self.strict,
            "executing check command"
        );
        let plan = self.signing.plan()?;
        let require_release = self.require_release || plan.require_release;

        let mut build_types = BuildTypes::new();
        let resolution = plan.resolve(&mut build_types);

        let failure = check_failure(&resolution, require_release, self.strict);
        let failed = failure.is_some();

        match cli.format {
            OutputFormat::Json => {
                let mut json = resolution_json(
                    &resolution,
                    &plan.properties_path,
                    plan.config_path.as_deref(),
                );
                json["passed"] = serde_json::Value::Bool(!failed);
                json["require_release"] = serde_json::Value::Bool(require_release);
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            OutputFormat::Text => {
                for warning in &resolution.warnings {
                    output::warning(warning);
                }
                if !failed && !cli.quiet {
                    if resolution.is_fallback() {
                        output::info("Release build type will use debug signing");
                    } else {
                        output::success("Release signing is configured");
                    }
                }
            }
        }

        if let Some(reason) = failure {
            info!(reason = %reason, "release signing check failed");
            return Err(CheckFailed(reason).into());
        }

        Ok(())
    }
}

/// Why the check fails, or `None` when it passes.
///
/// A debug fallback fails only when release signing is required. With
/// `strict`, any resolver warning fails the check.
fn check_failure(
    resolution: &SigningResolution,
    require_release: bool,
    strict: bool,
) -> Option<String> {
    let failed = (require_release && resolution.is_fallback())
        || (strict && !resolution.warnings.is_empty());
    if !failed {
        return None;
    }

    Some(
        resolution
            .fallback_reason()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "release signing config is incomplete".to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchkey_signing::{KeystoreProperties, ResolverOptions, SigningResolver};
    use tempfile::TempDir;

    fn resolver(temp: &TempDir) -> SigningResolver {
        SigningResolver::new(ResolverOptions {
            module_dir: temp.path().to_path_buf(),
            debug_keystore: temp.path().join("debug.keystore"),
            keystore_password_env: None,
            key_password_env: None,
        })
        .with_env_lookup(|_| None)
    }

    fn fallback(temp: &TempDir) -> SigningResolution {
        resolver(temp).resolve(None, false, &mut BuildTypes::new())
    }

    fn release(temp: &TempDir, contents: &str) -> SigningResolution {
        std::fs::write(temp.path().join("upload.jks"), b"keystore").unwrap();
        let props = KeystoreProperties::parse(contents).unwrap();
        resolver(temp).resolve(Some(&props), true, &mut BuildTypes::new())
    }

    #[test]
    fn test_fallback_passes_when_release_not_required() {
        let temp = TempDir::new().unwrap();
        let resolution = fallback(&temp);

        assert!(resolution.is_fallback());
        assert_eq!(check_failure(&resolution, false, false), None);
    }

    #[test]
    fn test_fallback_fails_when_release_required() {
        let temp = TempDir::new().unwrap();
        let resolution = fallback(&temp);

        let reason = check_failure(&resolution, true, false).unwrap();
        assert_eq!(reason, "keystore properties file not found");
    }

    #[test]
    fn test_incomplete_release_fails_only_when_strict() {
        let temp = TempDir::new().unwrap();
        let resolution = release(&temp, "storeFile=upload.jks\nkeyAlias=upload\n");

        assert!(!resolution.is_fallback());
        assert!(!resolution.warnings.is_empty());
        assert_eq!(check_failure(&resolution, true, false), None);
        assert_eq!(
            check_failure(&resolution, false, true).as_deref(),
            Some("release signing config is incomplete")
        );
    }

    #[test]
    fn test_complete_release_passes() {
        let temp = TempDir::new().unwrap();
        let resolution = release(
            &temp,
            "storeFile=upload.jks\nkeyAlias=upload\nkeyPassword=kp\nstorePassword=sp\n",
        );

        assert!(resolution.warnings.is_empty());
        assert_eq!(check_failure(&resolution, true, true), None);
    }

    #[test]
    fn test_check_failed_message() {
        let err = CheckFailed("keystore properties file not found".to_string());
        assert_eq!(
            err.to_string(),
            "Release signing check failed: keystore properties file not found"
        );
    }
}
