use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

/// Optional project-level defaults, read from `Snapdiff.toml` and `SNAPDIFF_*` variables.
///
/// The `DiffEngine_*` variables still win over anything configured here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub directory: Option<String>,
    pub auto_verify: bool,
    pub omit_content_from_error: bool,
    pub unique_for_os: bool,
    pub unique_for_arch: bool,
    pub tool_order: Vec<String>,
    pub max_instances: Option<usize>,
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_from("Snapdiff")
}

pub fn load_from(name: &str) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(name).required(false))
        .add_source(
            Environment::with_prefix("SNAPDIFF")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("tool_order"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = load_from(dir.path().join("absent").to_str().unwrap()).unwrap();
        assert!(!config.auto_verify);
        assert!(config.tool_order.is_empty());
        assert_eq!(config.max_instances, None);
    }

    #[test]
    fn test_reads_toml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Snapdiff.toml");
        fs::write(
            &path,
            "auto_verify = true\ntool_order = [\"Vim\", \"Meld\"]\nmax_instances = 2\n",
        )
        .unwrap();
        let config = load_from(dir.path().join("Snapdiff").to_str().unwrap()).unwrap();
        assert!(config.auto_verify);
        assert_eq!(config.tool_order, vec!["Vim", "Meld"]);
        assert_eq!(config.max_instances, Some(2));
    }
}
