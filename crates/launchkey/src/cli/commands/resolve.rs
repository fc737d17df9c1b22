//! Resolve command

use std::path::Path;

use clap::Args;
use console::style;
use tracing::info;

use launchkey_signing::{BuildTypes, Secret, SigningResolution, SigningSource};

use crate::cli::{output, Cli, OutputFormat};

use super::SigningArgs;

/// Show which signing config the release build type gets
#[derive(Debug, Args)]
pub struct ResolveCommand {
    #[command(flatten)]
    pub signing: SigningArgs,
}

impl ResolveCommand {
    /// Execute the resolve command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!("executing resolve command");
        let plan = self.signing.plan()?;

        let mut build_types = BuildTypes::new();
        let resolution = plan.resolve(&mut build_types);

        match cli.format {
            OutputFormat::Json => {
                let json = resolution_json(
                    &resolution,
                    &plan.properties_path,
                    plan.config_path.as_deref(),
                );
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    print_resolution(
                        &resolution,
                        &plan.properties_path,
                        plan.config_path.as_deref(),
                    );
                }
            }
        }

        Ok(())
    }
}

/// JSON view of a resolution. Passwords are redacted.
pub(crate) fn resolution_json(
    resolution: &SigningResolution,
    properties_path: &Path,
    config_path: Option<&Path>,
) -> serde_json::Value {
    let reason = resolution.fallback_reason();
    serde_json::json!({
        "build_type": resolution.build_type,
        "source": resolution.source.to_string(),
        "reason": reason.map(|r| r.code()),
        "message": reason.map(|r| r.to_string()),
        "properties_file": properties_path.display().to_string(),
        "config_file": config_path.map(|p| p.display().to_string()),
        "signing_config": resolution.config,
        "warnings": resolution.warnings,
    })
}

fn password_state(password: &Option<Secret>) -> String {
    match password {
        Some(secret) if !secret.is_empty() => secret.to_string(),
        _ => style("not set").red().to_string(),
    }
}

fn print_resolution(
    resolution: &SigningResolution,
    properties_path: &Path,
    config_path: Option<&Path>,
) {
    let config = &resolution.config;

    println!("{}", output::header("Release signing"));
    let config_file = match config_path {
        Some(path) => output::path_style().apply_to(path.display()).to_string(),
        None => style("defaults").dim().to_string(),
    };
    println!("{}", output::key_value("config", &config_file));
    println!(
        "{}",
        output::key_value(
            "properties",
            &output::path_style()
                .apply_to(properties_path.display())
                .to_string()
        )
    );
    println!("{}", output::key_value("build type", &resolution.build_type));
    println!("{}", output::key_value("signing config", config.name()));
    println!(
        "{}",
        output::key_value(
            "store file",
            &output::path_style()
                .apply_to(config.store_file.display())
                .to_string()
        )
    );
    println!(
        "{}",
        output::key_value("key alias", config.key_alias.as_deref().unwrap_or("-"))
    );
    println!(
        "{}",
        output::key_value("store password", &password_state(&config.store_password))
    );
    println!(
        "{}",
        output::key_value("key password", &password_state(&config.key_password))
    );
    println!();

    for warning in &resolution.warnings {
        output::warning(warning);
    }

    match &resolution.source {
        SigningSource::Release => output::success("Using release signing configuration"),
        SigningSource::DebugFallback(_) => {
            output::info("Release build type falls back to debug signing")
        }
    }
}
