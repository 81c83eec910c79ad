//! Locates tool executables from path templates.
//!
//! A template may reference environment variables (`%VAR%`, `$VAR`, `${VAR}`) and may contain
//! `*` wildcards in directory segments. When several directories match a wildcard, the most
//! recently modified one wins.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use glob::Pattern;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;
use walkdir::WalkDir;

use crate::env::{EnvReader, SystemEnv};
use crate::error::{Error, Result};

lazy_static! {
    static ref ENV_REFERENCE: Regex =
        Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)|%([^%/\\]+)%")
            .expect("env reference pattern is valid");
}

#[derive(Clone)]
pub struct Finder {
    env: Arc<dyn EnvReader>,
}

impl Default for Finder {
    fn default() -> Self {
        Self::new(Arc::new(SystemEnv))
    }
}

impl Finder {
    pub fn new(env: Arc<dyn EnvReader>) -> Self {
        Self { env }
    }

    /// Substitutes environment references. Unset `$VAR` becomes empty; unset `%VAR%` is kept.
    pub fn expand(&self, template: &str) -> String {
        ENV_REFERENCE
            .replace_all(template, |caps: &Captures| {
                if let Some(name) = caps.get(1).or_else(|| caps.get(2)) {
                    return self.env.lookup(name.as_str()).unwrap_or_default();
                }
                let name = &caps[3];
                self.env
                    .lookup(name)
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// First template (after de-duplication) that resolves to an existing file.
    pub fn find_any(&self, templates: &[String]) -> Result<Option<PathBuf>> {
        let mut seen = HashSet::new();
        for template in templates {
            if !seen.insert(template.as_str()) {
                continue;
            }
            if let Some(found) = self.find(template)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    pub fn find(&self, template: &str) -> Result<Option<PathBuf>> {
        let expanded = self.expand(template);
        if !expanded.contains('*') {
            let path = PathBuf::from(&expanded);
            if path.is_file() {
                return Ok(Some(path));
            }
            debug!("Could not find file: {}", template);
            return Ok(None);
        }

        let expanded_path = Path::new(&expanded);
        let file_part = expanded_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if file_part.contains('*') {
            return Err(Error::WildcardInFileName(template.to_string()));
        }

        let directory_part = match expanded_path.parent() {
            Some(parent) if parent.is_absolute() => parent.to_path_buf(),
            Some(parent) => std::env::current_dir()?.join(parent),
            None => std::env::current_dir()?,
        };

        // Newest match first.
        for directory in matching_directories(&directory_part).iter().rev() {
            let candidate = directory.join(&file_part);
            if candidate.is_file() {
                return Ok(Some(candidate));
            }
        }

        debug!("Could not find file: {}", template);
        Ok(None)
    }
}

/// Expands wildcard segments of `directory`, ordered oldest to newest by modification time.
pub fn matching_directories(directory: &Path) -> Vec<PathBuf> {
    if !directory.to_string_lossy().contains('*') {
        return if directory.is_dir() {
            vec![directory.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let mut roots: Vec<PathBuf> = vec![PathBuf::new()];
    for component in directory.components() {
        let segment = component.as_os_str().to_string_lossy();
        let is_wildcard = matches!(component, Component::Normal(_)) && segment.contains('*');

        let mut next_roots = Vec::new();
        for root in &roots {
            if is_wildcard {
                next_roots.extend(directories_from_root(root, &segment));
            } else {
                let next = root.join(component.as_os_str());
                if matches!(component, Component::Prefix(_) | Component::RootDir) || next.is_dir()
                {
                    next_roots.push(next);
                }
            }
        }

        if next_roots.is_empty() {
            return Vec::new();
        }
        roots = next_roots;
    }
    roots
}

/// Recursively collects directories under `root` whose name matches `segment`.
fn directories_from_root(root: &Path, segment: &str) -> Vec<PathBuf> {
    let Ok(pattern) = Pattern::new(segment) else {
        debug!("Invalid wildcard segment: {}", segment);
        return Vec::new();
    };

    let mut matches: Vec<(SystemTime, PathBuf)> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter(|entry| pattern.matches(&entry.file_name().to_string_lossy()))
        .map(|entry| {
            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, entry.into_path())
        })
        .collect();

    matches.sort_by(|a, b| a.0.cmp(&b.0));
    matches.into_iter().map(|(_, path)| path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;

    #[test]
    fn test_expand_env_forms() {
        let finder = Finder::new(Arc::new(
            MapEnv::new().with("HOME", "/home/me").with("ProgramFiles", "C:/PF"),
        ));
        assert_eq!(finder.expand("$HOME/bin"), "/home/me/bin");
        assert_eq!(finder.expand("${HOME}/bin"), "/home/me/bin");
        assert_eq!(finder.expand("%ProgramFiles%/Meld"), "C:/PF/Meld");
        assert_eq!(finder.expand("%Missing%/x"), "%Missing%/x");
        assert_eq!(finder.expand("$MISSING/x"), "/x");
    }

    #[test]
    fn test_wildcard_in_file_name_is_rejected() {
        let finder = Finder::new(Arc::new(MapEnv::new()));
        let result = finder.find("/tmp/some*/tool*.exe");
        assert!(matches!(result, Err(Error::WildcardInFileName(_))));
    }
}
