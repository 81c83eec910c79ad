//! Snapshot file naming and the process-wide prefix registry.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use glob::Pattern;
use lazy_static::lazy_static;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::platform::Os;
use crate::verify::settings::VerifySettings;

lazy_static! {
    static ref PREFIXES: Mutex<HashSet<PathBuf>> = Mutex::new(HashSet::new());
}

/// Who is verifying: the test's source file and its name.
///
/// A `name/case` test name carries its case after the slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestIdentity {
    pub source_file: PathBuf,
    pub test_name: String,
}

impl TestIdentity {
    pub fn new(source_file: impl Into<PathBuf>, test_name: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            test_name: test_name.into(),
        }
    }
}

/// Where a verifier reads and writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLocation {
    pub directory: PathBuf,
    /// `{source}.{test}[.{case}][.{uniqueness}]`
    pub file_name: String,
    pub prefix: PathBuf,
}

impl SnapshotLocation {
    /// Resolves the names and creates the snapshot directory when missing.
    pub fn resolve(identity: &TestIdentity, settings: &VerifySettings) -> Result<Self> {
        let name = test_case_name(&identity.test_name, settings.test_case.as_deref())?;
        let source_stem = identity
            .source_file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = format!("{}.{}{}", source_stem, name, uniqueness(settings));

        let directory = match &settings.directory {
            Some(directory) => directory.clone(),
            None => identity
                .source_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        if !directory.as_os_str().is_empty() && !directory.exists() {
            debug!("Creating snapshot directory {}", directory.display());
            fs::create_dir_all(&directory)?;
        }

        Ok(Self {
            prefix: directory.join(&file_name),
            directory,
            file_name,
        })
    }

    /// Verified files from earlier runs: `prefix.verified.*` and `prefix.NN.verified.*`.
    pub fn verified_files(&self) -> Vec<PathBuf> {
        find_matching_files(&self.candidates(), &self.file_name, ".verified")
    }

    pub fn received_files(&self) -> Vec<PathBuf> {
        find_matching_files(&self.candidates(), &self.file_name, ".received")
    }

    fn candidates(&self) -> Vec<PathBuf> {
        let pattern = match Pattern::new(&format!("{}.*.*", Pattern::escape(&self.file_name))) {
            Ok(pattern) => pattern,
            Err(e) => {
                debug!("Invalid snapshot pattern for {}: {}", self.file_name, e);
                return Vec::new();
            }
        };
        let root = if self.directory.as_os_str().is_empty() {
            Path::new(".")
        } else {
            self.directory.as_path()
        };
        let mut found: Vec<PathBuf> = WalkDir::new(root)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| pattern.matches(&entry.file_name().to_string_lossy()))
            .map(|entry| entry.into_path())
            .collect();
        found.sort();
        found
    }
}

/// `test_works` + case `a` gives `works.a`. Requires a test name or a case.
pub fn test_case_name(test_name: &str, test_case: Option<&str>) -> Result<String> {
    let mut parts = test_name.splitn(2, '/');
    let test = remove_test_prefix(parts.next().unwrap_or_default());
    let case = test_case
        .filter(|case| !case.is_empty())
        .or_else(|| parts.next().filter(|case| !case.is_empty()));

    match (test.is_empty(), case) {
        (false, Some(case)) => Ok(format!("{}.{}", test, case)),
        (false, None) => Ok(test.to_string()),
        (true, Some(case)) => Ok(case.to_string()),
        (true, None) => Err(Error::TestNameUnresolved),
    }
}

fn remove_test_prefix(test_name: &str) -> &str {
    test_name
        .strip_prefix("test_")
        .or_else(|| test_name.strip_prefix("Test"))
        .unwrap_or(test_name)
}

/// `.{arch}` and/or `.{os}` when the settings ask for per-platform snapshots.
pub fn uniqueness(settings: &VerifySettings) -> String {
    let mut unique = String::new();
    if settings.unique_for_arch {
        unique.push('.');
        unique.push_str(std::env::consts::ARCH);
    }
    if settings.unique_for_os {
        unique.push('.');
        unique.push_str(Os::current().name());
    }
    unique
}

/// Keeps files named `{prefix}{suffix}.ext` or `{prefix}.{NN}{suffix}.ext`.
pub fn find_matching_files(files: &[PathBuf], prefix: &str, suffix: &str) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|file| {
            let Some(name) = file.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                return false;
            };
            let Some(rest) = name.strip_prefix(prefix) else {
                return false;
            };
            if rest == suffix {
                return true;
            }
            rest.strip_suffix(suffix)
                .and_then(|middle| middle.strip_prefix('.'))
                .map(|number| !number.is_empty() && number.parse::<u32>().is_ok())
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Registers a prefix for this process. A second claim fails.
pub fn claim_prefix(prefix: &Path) -> Result<()> {
    let mut prefixes = PREFIXES.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if !prefixes.insert(prefix.to_path_buf()) {
        return Err(Error::PrefixInUse(prefix.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn settings() -> VerifySettings {
        VerifySettings::with_env(Arc::new(MapEnv::new()))
    }

    #[test]
    fn test_case_name_combinations() {
        assert_eq!(test_case_name("test_works", None).unwrap(), "works");
        assert_eq!(test_case_name("TestWorks", None).unwrap(), "Works");
        assert_eq!(test_case_name("test_works", Some("a")).unwrap(), "works.a");
        assert_eq!(test_case_name("test_table/row_1", None).unwrap(), "table.row_1");
        assert_eq!(test_case_name("test_table/row_1", Some("x")).unwrap(), "table.x");
        assert_eq!(test_case_name("", Some("only")).unwrap(), "only");
        assert!(matches!(test_case_name("test_", None), Err(Error::TestNameUnresolved)));
    }

    #[test]
    fn test_uniqueness_suffix() {
        assert_eq!(uniqueness(&settings()), "");
        let both = uniqueness(&settings().unique_for_arch().unique_for_os());
        assert_eq!(both, format!(".{}.{}", std::env::consts::ARCH, Os::current().name()));
    }

    #[test]
    fn test_find_matching_files() {
        let files: Vec<PathBuf> = [
            "lib.works.verified.txt",
            "lib.works.00.verified.txt",
            "lib.works.01.verified.png",
            "lib.works.received.txt",
            "lib.works.extra.verified.txt",
            "lib.works_more.verified.txt",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        let verified = find_matching_files(&files, "lib.works", ".verified");
        assert_eq!(
            verified,
            vec![
                PathBuf::from("lib.works.verified.txt"),
                PathBuf::from("lib.works.00.verified.txt"),
                PathBuf::from("lib.works.01.verified.png"),
            ]
        );
        let received = find_matching_files(&files, "lib.works", ".received");
        assert_eq!(received, vec![PathBuf::from("lib.works.received.txt")]);
    }

    #[test]
    fn test_resolve_creates_directory_and_lists_files() {
        let dir = tempdir().unwrap();
        let snaps = dir.path().join("snaps");
        let identity = TestIdentity::new("tests/lib.rs", "test_works");
        let location = SnapshotLocation::resolve(&identity, &settings().use_directory(&snaps)).unwrap();

        assert!(snaps.is_dir());
        assert_eq!(location.file_name, "lib.works");
        assert_eq!(location.prefix, snaps.join("lib.works"));

        fs::write(snaps.join("lib.works.verified.txt"), "v").unwrap();
        fs::write(snaps.join("lib.works.received.txt"), "r").unwrap();
        fs::write(snaps.join("lib.other.verified.txt"), "o").unwrap();
        assert_eq!(location.verified_files(), vec![snaps.join("lib.works.verified.txt")]);
        assert_eq!(location.received_files(), vec![snaps.join("lib.works.received.txt")]);
    }

    #[test]
    fn test_default_directory_is_source_directory() {
        let dir = tempdir().unwrap();
        let identity = TestIdentity::new(dir.path().join("module.rs"), "test_a");
        let location = SnapshotLocation::resolve(&identity, &settings()).unwrap();
        assert_eq!(location.directory, dir.path());
    }

    #[test]
    fn test_prefix_claimed_twice_fails() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("claimed");
        claim_prefix(&prefix).unwrap();
        assert!(matches!(claim_prefix(&prefix), Err(Error::PrefixInUse(_))));
    }
}
