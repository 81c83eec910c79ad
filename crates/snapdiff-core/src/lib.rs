pub mod config;
pub mod diff;
pub mod env;
pub mod error;
pub mod files;
pub mod platform;
pub mod tray;
pub mod verify;

pub use config::AppConfig;
pub use diff::{DiffLauncher, DiffRunner, LaunchResult, NoDiff, ToolKind, Tools};
pub use env::{EnvReader, MapEnv, SystemEnv};
pub use error::{Error, Result};
pub use verify::{
    assert_verified, Snapshot, Target, TestIdentity, VerifyResult, VerifySettings, Verifier,
};
