//! Bridge from `scopefs_config::Config` to the VFS.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use scopefs_config::Config;
use scopefs_vfs::{ScopedVfs, VfsOptions};
use tracing::debug;

/// Command-line flags that take precedence over every config layer.
#[derive(Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) root: Option<PathBuf>,
    pub(crate) task: Option<String>,
    pub(crate) run: Option<String>,
    pub(crate) debug: bool,
}

/// Load layered config, apply flag overrides and re-validate.
pub(crate) fn load(explicit: Option<&Path>, overrides: &Overrides) -> Result<Config> {
    let resolved = Config::load(explicit).context("failed to load configuration")?;
    debug!(
        files = ?resolved.loaded_files,
        env = ?resolved.env_fields,
        "configuration resolved"
    );

    let mut config = resolved.config;
    apply_overrides(&mut config, overrides);
    scopefs_config::validate::validate(&config).context("invalid command-line override")?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, overrides: &Overrides) {
    if let Some(root) = &overrides.root {
        config.vfs.root = Some(root.clone());
    }
    if let Some(task) = &overrides.task {
        config.vfs.task_id.clone_from(task);
    }
    if let Some(run) = &overrides.run {
        config.vfs.run_id.clone_from(run);
    }
    if overrides.debug {
        config.vfs.debug = true;
    }
}

/// VFS construction options described by `config`.
pub(crate) fn to_vfs_options(config: &Config) -> Result<VfsOptions> {
    let root = config.vfs.ecosystem_root()?;
    Ok(
        VfsOptions::new(root, config.vfs.task_id.clone(), config.vfs.run_id.clone())
            .with_debug(config.vfs.debug)
            .with_event_capacity(config.events.channel_capacity),
    )
}

/// Open the VFS described by `config`, creating its scope roots.
pub(crate) async fn open_vfs(config: &Config) -> Result<Arc<ScopedVfs>> {
    let options = to_vfs_options(config)?;
    let root = options.ecosystem_root.display().to_string();
    let vfs = ScopedVfs::open(options)
        .await
        .with_context(|| format!("failed to open scoped VFS under {root}"))?;
    Ok(Arc::new(vfs))
}
