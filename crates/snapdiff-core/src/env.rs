//! Environment access and build-server detection.
//!
//! Everything that reads process environment goes through [`EnvReader`] so
//! detection and tool resolution can run against a fixed map in tests.

use std::collections::HashMap;

use crate::error::{Error, Result};

pub const DISABLED_VAR: &str = "DiffEngine_Disabled";
pub const TOOL_ORDER_VAR: &str = "DiffEngine_ToolOrder";
pub const MAX_INSTANCES_VAR: &str = "DiffEngine_MaxInstances";
pub const TARGET_ON_LEFT_VAR: &str = "DiffEngine_TargetOnLeft";

pub trait EnvReader: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl EnvReader for SystemEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Fixed set of variables, used wherever the real environment must not leak in.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl EnvReader for MapEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildServer {
    AppVeyor,
    Jenkins,
    GitHub,
    AzureDevOps,
    TeamCity,
    MyGet,
    GitLab,
}

impl BuildServer {
    /// Detection order.
    pub const ALL: [BuildServer; 7] = [
        BuildServer::AppVeyor,
        BuildServer::Jenkins,
        BuildServer::GitHub,
        BuildServer::AzureDevOps,
        BuildServer::TeamCity,
        BuildServer::MyGet,
        BuildServer::GitLab,
    ];

    pub fn variable(&self) -> &'static str {
        match self {
            BuildServer::AppVeyor => "CI",
            BuildServer::Jenkins => "JENKINS_URL",
            BuildServer::GitHub => "GITHUB_ACTION",
            BuildServer::AzureDevOps => "AGENT_ID",
            BuildServer::TeamCity => "TEAMCITY_VERSION",
            BuildServer::MyGet => "BuildRunner",
            BuildServer::GitLab => "GITLAB_CI",
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        match self {
            BuildServer::AppVeyor => lowered == "true",
            BuildServer::MyGet => lowered == "myget",
            _ => !lowered.is_empty(),
        }
    }
}

fn lookup_lowered(env: &dyn EnvReader, key: &str) -> String {
    env.lookup(key)
        .map(|value| value.to_lowercase())
        .unwrap_or_default()
}

/// First build server whose marker variable is set.
pub fn detect_ci(env: &dyn EnvReader) -> Option<BuildServer> {
    BuildServer::ALL
        .into_iter()
        .find(|server| server.matches(&lookup_lowered(env, server.variable())))
}

pub fn is_ci(env: &dyn EnvReader) -> bool {
    detect_ci(env).is_some()
}

/// Diff launching is off when explicitly disabled or when running on a build server.
pub fn is_disabled(env: &dyn EnvReader) -> bool {
    lookup_lowered(env, DISABLED_VAR) == "true" || is_ci(env)
}

/// Strict boolean: only `true`/`false` in any case are accepted.
pub fn read_bool(env: &dyn EnvReader, key: &str) -> Result<Option<bool>> {
    let Some(value) = env.lookup(key) else {
        return Ok(None);
    };
    match value.to_lowercase().as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        _ => Err(Error::InvalidEnv {
            key: key.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_ci_in_empty_env() {
        assert_eq!(detect_ci(&MapEnv::new()), None);
        assert!(!is_disabled(&MapEnv::new()));
    }

    #[test]
    fn test_detects_each_build_server() {
        let cases = [
            ("CI", "True", BuildServer::AppVeyor),
            ("JENKINS_URL", "http://jenkins", BuildServer::Jenkins),
            ("GITHUB_ACTION", "run", BuildServer::GitHub),
            ("AGENT_ID", "12", BuildServer::AzureDevOps),
            ("TEAMCITY_VERSION", "2023.1", BuildServer::TeamCity),
            ("BuildRunner", "MyGet", BuildServer::MyGet),
            ("GITLAB_CI", "true", BuildServer::GitLab),
        ];
        for (key, value, expected) in cases {
            let env = MapEnv::new().with(key, value);
            assert_eq!(detect_ci(&env), Some(expected), "{key}={value}");
            assert!(is_disabled(&env));
        }
    }

    #[test]
    fn test_non_matching_values_are_ignored() {
        let env = MapEnv::new()
            .with("CI", "1")
            .with("BuildRunner", "other")
            .with("JENKINS_URL", "");
        assert_eq!(detect_ci(&env), None);
    }

    #[test]
    fn test_disabled_flag_is_case_insensitive() {
        assert!(is_disabled(&MapEnv::new().with(DISABLED_VAR, "TRUE")));
        assert!(!is_disabled(&MapEnv::new().with(DISABLED_VAR, "yes")));
    }

    #[test]
    fn test_read_bool() {
        let env = MapEnv::new()
            .with("A", "True")
            .with("B", "FALSE")
            .with("C", "maybe");
        assert_eq!(read_bool(&env, "A").unwrap(), Some(true));
        assert_eq!(read_bool(&env, "B").unwrap(), Some(false));
        assert_eq!(read_bool(&env, "MISSING").unwrap(), None);
        assert!(matches!(
            read_bool(&env, "C"),
            Err(Error::InvalidEnv { .. })
        ));
    }
}
