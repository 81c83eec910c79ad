use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Extension must not start with a period: {0}")]
    BadExtension(String),

    #[error("Tool with name already exists. Name: {0}")]
    DuplicateTool(String),

    #[error("`DiffEngine_ToolOrder` is configured to use '{0}' but it is not installed.")]
    ToolNotInstalled(String),

    #[error(
        "The prefix has already been used: {0}. This is mostly caused by a conflicting \
         combination of directory, file name, test name and test case. \
         Disable the unique prefix check to allow reuse."
    )]
    PrefixInUse(PathBuf),

    #[error("Wildcard in file part currently not supported: {0}")]
    WildcardInFileName(String),

    #[error("Unable to parse `{key}` environment variable: {value}")]
    InvalidEnv { key: String, value: String },

    #[error("File not found. Path: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Test name can't be determined. Provide a test name or a test case.")]
    TestNameUnresolved,

    #[error("{0}")]
    Mismatch(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
