//! Options shared by the commands that run the resolver

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use launchkey_core::config::{load_config_or_default, SigningSettings};
use launchkey_signing::identity::resolve_store_file;
use launchkey_signing::{
    default_debug_keystore, ResolverOptions, SigningConfigSink, SigningResolution,
    SigningResolver,
};

/// Where to find signing credentials
#[derive(Debug, Clone, Default, Args)]
pub struct SigningArgs {
    /// Keystore properties file (overrides the configured location)
    #[arg(long, env = "LAUNCHKEY_PROPERTIES")]
    pub properties: Option<PathBuf>,

    /// Android project root
    #[arg(long)]
    pub android_dir: Option<PathBuf>,

    /// Application module directory, relative to the Android project root
    #[arg(long)]
    pub module_dir: Option<PathBuf>,

    /// Debug keystore used for fallback signing
    #[arg(long)]
    pub debug_keystore: Option<PathBuf>,
}

/// Everything needed for one resolution pass
pub struct SigningPlan {
    pub properties_path: PathBuf,
    pub resolver: SigningResolver,
    pub require_release: bool,
    pub config_path: Option<PathBuf>,
}

impl SigningPlan {
    /// Run the resolver against the planned properties file
    pub fn resolve(&self, sink: &mut dyn SigningConfigSink) -> SigningResolution {
        self.resolver.resolve_file(&self.properties_path, sink)
    }
}

impl SigningArgs {
    /// Load configuration from the working directory and apply CLI overrides
    pub fn plan(&self) -> anyhow::Result<SigningPlan> {
        let cwd = std::env::current_dir()?;
        let (config, config_path) = load_config_or_default(&cwd)?;

        // Paths in a config file are relative to the file's directory
        let project_dir = config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cwd.clone());

        let plan = self.plan_with(config.signing, &project_dir, &cwd, config_path);
        debug!(
            properties = %plan.properties_path.display(),
            module_dir = %plan.resolver.options().module_dir.display(),
            "signing plan ready"
        );
        Ok(plan)
    }

    fn plan_with(
        &self,
        mut settings: SigningSettings,
        project_dir: &Path,
        cwd: &Path,
        config_path: Option<PathBuf>,
    ) -> SigningPlan {
        // CLI paths are relative to the working directory
        let mut root = project_dir.to_path_buf();
        if let Some(android_dir) = &self.android_dir {
            settings.android_dir = cwd.join(android_dir);
            root = cwd.to_path_buf();
        }
        if let Some(module_dir) = &self.module_dir {
            settings.module_dir = module_dir.clone();
        }

        let properties_path = match &self.properties {
            Some(path) => cwd.join(path),
            None => settings.properties_path(&root),
        };

        let debug_keystore = match (&self.debug_keystore, &settings.debug_keystore) {
            (Some(path), _) => cwd.join(path),
            (None, Some(path)) => resolve_store_file(&path.to_string_lossy(), project_dir),
            (None, None) => default_debug_keystore(),
        };

        let options = ResolverOptions {
            module_dir: settings.module_path(&root),
            debug_keystore,
            keystore_password_env: Some(settings.keystore_password_env.clone()),
            key_password_env: Some(settings.key_password_env.clone()),
        };

        SigningPlan {
            properties_path,
            resolver: SigningResolver::new(options),
            require_release: settings.require_release,
            config_path,
        }
    }
}
