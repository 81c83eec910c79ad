use std::sync::Mutex;

use crate::env::{EnvReader, MAX_INSTANCES_VAR};
use crate::error::{Error, Result};

pub const DEFAULT_MAX_INSTANCES: usize = 5;

/// Throttles how many diff tool instances one process may launch.
#[derive(Debug)]
pub struct InstanceCounter {
    launched: Mutex<usize>,
    max: usize,
}

impl InstanceCounter {
    pub fn new(max: usize) -> Self {
        Self {
            launched: Mutex::new(0),
            max,
        }
    }

    /// Reads `DiffEngine_MaxInstances`, falling back to `fallback` then the default.
    pub fn from_env(env: &dyn EnvReader, fallback: Option<usize>) -> Result<Self> {
        let max = match env.lookup(MAX_INSTANCES_VAR) {
            Some(value) => value
                .trim()
                .parse::<i16>()
                .ok()
                .and_then(|parsed| usize::try_from(parsed).ok())
                .ok_or_else(|| Error::InvalidEnv {
                    key: MAX_INSTANCES_VAR.to_string(),
                    value,
                })?,
            None => fallback.unwrap_or(DEFAULT_MAX_INSTANCES),
        };
        Ok(Self::new(max))
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Counts an attempted launch, then reports whether the limit is now exceeded.
    pub fn reached_max(&self) -> bool {
        let mut launched = self
            .launched
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *launched += 1;
        *launched > self.max
    }
}

impl Default for InstanceCounter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INSTANCES)
    }
}
