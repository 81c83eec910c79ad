use std::path::{Path, PathBuf};

use crate::files;

/// The received/verified pair for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub extension: String,
    pub name: String,
    pub received_path: PathBuf,
    pub verified_path: PathBuf,
    pub received_name: String,
    pub verified_name: String,
    pub is_text: bool,
}

impl FilePair {
    /// `prefix.received.ext` / `prefix.verified.ext`.
    pub fn new(extension: &str, prefix: &Path) -> Self {
        let prefix_str = prefix.to_string_lossy();
        let received_path = PathBuf::from(format!("{}.received.{}", prefix_str, extension));
        let verified_path = PathBuf::from(format!("{}.verified.{}", prefix_str, extension));
        Self {
            extension: extension.to_string(),
            name: base_name(prefix),
            received_name: base_name(&received_path),
            verified_name: base_name(&verified_path),
            received_path,
            verified_path,
            is_text: files::is_text(extension),
        }
    }

    /// Pair for the `index`th of several targets: `prefix.NN.received.ext`.
    pub fn indexed(extension: &str, prefix: &Path, index: usize) -> Self {
        let indexed = format!("{}.{:02}", prefix.to_string_lossy(), index);
        Self::new(extension, Path::new(&indexed))
    }
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
