//! Gradle args command
//!
//! Prints the resolved release signing config as Android Gradle Plugin
//! injected signing properties, for example:
//!
//! ```text
//! ./gradlew assembleRelease $(launchkey gradle-args)
//! ```

use clap::Args;
use tracing::info;

use launchkey_signing::{GradleInjectedSigning, RELEASE_BUILD_TYPE};

use crate::cli::{output, Cli, OutputFormat};

use super::SigningArgs;

/// Print Android Gradle Plugin injected signing arguments
#[derive(Debug, Args)]
pub struct GradleArgsCommand {
    #[command(flatten)]
    pub signing: SigningArgs,

    /// Replace passwords with a placeholder
    #[arg(long)]
    pub redact: bool,
}

impl GradleArgsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(redact = self.redact, "executing gradle-args command");
        let plan = self.signing.plan()?;

        let mut gradle = GradleInjectedSigning::new(RELEASE_BUILD_TYPE);
        let resolution = plan.resolve(&mut gradle);

        if !cli.quiet {
            for warning in &resolution.warnings {
                output::warning(warning);
            }
        }

        let args = if self.redact {
            gradle.redacted_args()
        } else {
            gradle.args()
        };

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&args)?),
            OutputFormat::Text => {
                for arg in &args {
                    println!("{}", arg);
                }
            }
        }

        Ok(())
    }
}
