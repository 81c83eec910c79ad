use std::sync::atomic::{AtomicBool, Ordering};

use lazy_static::lazy_static;
use tracing::warn;

use crate::env::{self, EnvReader, SystemEnv, TARGET_ON_LEFT_VAR};
use crate::error::Result;

lazy_static! {
    static ref TARGET_ON_LEFT: AtomicBool = AtomicBool::new(initial_target_on_left());
}

fn initial_target_on_left() -> bool {
    match read_target_on_left(&SystemEnv) {
        Ok(value) => value,
        Err(e) => {
            warn!("{}. Falling back to the target on the right.", e);
            false
        }
    }
}

/// Reads `DiffEngine_TargetOnLeft`. Unset means the target goes on the right.
pub fn read_target_on_left(env: &dyn EnvReader) -> Result<bool> {
    Ok(env::read_bool(env, TARGET_ON_LEFT_VAR)?.unwrap_or(false))
}

/// Process-wide placement of the verified file, read once from the environment.
pub fn target_on_left() -> bool {
    TARGET_ON_LEFT.load(Ordering::Relaxed)
}

pub fn set_target_on_left(value: bool) {
    TARGET_ON_LEFT.store(value, Ordering::Relaxed);
}
