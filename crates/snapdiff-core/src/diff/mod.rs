pub mod counter;
pub mod definitions;
pub mod finder;
pub mod position;
pub mod process;
pub mod runner;
pub mod tools;

use std::path::Path;
use std::sync::{Arc, Mutex};

use lazy_static::lazy_static;
use tracing::debug;

use crate::config::AppConfig;
use crate::env::EnvReader;
use crate::error::Result;

pub use definitions::{ToolDefinition, ToolKind};
pub use runner::{DiffRunner, LaunchResult};
pub use tools::{CustomTool, ResolvedTool, Tools};

/// Opens and closes diff tools for a received/verified pair.
///
/// The verifier only talks to this trait; [`DiffRunner`] is the real implementation.
pub trait DiffLauncher: Send + Sync {
    fn launch(&self, temp: &Path, target: &Path) -> Result<LaunchResult>;

    fn kill(&self, _temp: &Path, _target: &Path) {}

    /// Tells the tray helper a verified file is no longer produced.
    fn notify_delete(&self, _file: &Path) {}
}

/// Launcher that never opens anything.
pub struct NoDiff;

impl DiffLauncher for NoDiff {
    fn launch(&self, _temp: &Path, _target: &Path) -> Result<LaunchResult> {
        Ok(LaunchResult::Disabled)
    }
}

lazy_static! {
    static ref SHARED_LAUNCHER: Mutex<Option<Arc<dyn DiffLauncher>>> = Mutex::new(None);
}

/// Makes `launcher` the process-wide default. Returns false if one is already in place.
pub fn install_shared_launcher(launcher: Arc<dyn DiffLauncher>) -> bool {
    let mut shared = SHARED_LAUNCHER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if shared.is_some() {
        return false;
    }
    *shared = Some(launcher);
    true
}

/// Process-wide launcher used by every verification without its own.
///
/// Built once from the first `env` and `config` that ask for it, so the instance
/// throttle and the process snapshot span the whole run.
pub fn shared_launcher(env: Arc<dyn EnvReader>, config: &AppConfig) -> Result<Arc<dyn DiffLauncher>> {
    let mut shared = SHARED_LAUNCHER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(launcher) = shared.as_ref() {
        return Ok(Arc::clone(launcher));
    }
    debug!("Creating the shared diff runner");
    let runner: Arc<dyn DiffLauncher> = Arc::new(DiffRunner::from_config(env, config)?);
    *shared = Some(Arc::clone(&runner));
    Ok(runner)
}
