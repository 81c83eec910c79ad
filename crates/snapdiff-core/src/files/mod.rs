//! File helpers shared by the verifier and the diff runner.

mod text_extensions;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
pub use text_extensions::TEXT_EXTENSIONS;

pub const RECEIVED_MARKER: &str = ".received.";
pub const VERIFIED_MARKER: &str = ".verified.";

/// Accepts either a bare extension (`txt`) or a path (`dir/a.txt`) and returns the extension.
pub fn file_extension(extension_or_path: &str) -> String {
    if !extension_or_path.contains('.') {
        return extension_or_path.to_string();
    }
    let name = Path::new(extension_or_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_string())
        .unwrap_or_default()
}

pub fn guard_extension(extension: &str) -> Result<()> {
    if extension.is_empty() || extension.starts_with('.') {
        return Err(Error::BadExtension(extension.to_string()));
    }
    Ok(())
}

pub fn is_text(extension_or_path: &str) -> bool {
    let extension = file_extension(extension_or_path);
    TEXT_EXTENSIONS.binary_search(&extension.as_str()).is_ok()
}

pub fn is_empty_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() == 0).unwrap_or(false)
}

pub fn delete_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// An empty snapshot counts as no snapshot.
pub fn delete_if_empty(path: &Path) -> io::Result<()> {
    if path.is_file() && is_empty_file(path) {
        debug!("Deleting empty file {}", path.display());
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Rename, falling back to copy and delete across filesystems.
pub fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }
    fs::copy(source, dest)?;
    fs::remove_file(source)
}

/// Creates an empty placeholder when `use_empty_for_text` is set and the path is a text file.
///
/// Returns `false` without touching the disk for anything else.
pub fn try_create_file(path: &Path, use_empty_for_text: bool) -> io::Result<bool> {
    let path_str = path.to_string_lossy();
    if !use_empty_for_text || !is_text(&path_str) {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    delete_if_exists(path)?;
    fs::write(path, "")?;
    Ok(true)
}

pub fn read_text_lossy(path: &Path) -> String {
    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// All `*.received.*` files under `root`, sorted by path.
pub fn find_received_files(root: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .contains(RECEIVED_MARKER)
        })
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}

/// `a.received.txt` -> `a.verified.txt`.
pub fn verified_path_for(received: &Path) -> Option<PathBuf> {
    let name = received.file_name()?.to_string_lossy();
    let index = name.rfind(RECEIVED_MARKER)?;
    let verified = format!(
        "{}{}{}",
        &name[..index],
        VERIFIED_MARKER,
        &name[index + RECEIVED_MARKER.len()..]
    );
    Some(received.with_file_name(verified))
}

/// Replaces the verified snapshot with the received one.
pub fn accept_received(received: &Path) -> Result<PathBuf> {
    let verified = verified_path_for(received)
        .ok_or_else(|| Error::Other(format!("Not a received file: {}", received.display())))?;
    delete_if_exists(&verified)?;
    move_file(received, &verified)?;
    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("txt"), "txt");
        assert_eq!(file_extension("dir/name.received.json"), "json");
        assert_eq!(file_extension("name.png"), "png");
        assert_eq!(file_extension(".jpg"), "jpg");
    }

    #[test]
    fn test_is_text() {
        assert!(is_text("txt"));
        assert!(is_text("a/b/c.json"));
        assert!(is_text("rs"));
        assert!(!is_text("png"));
        assert!(!is_text("bin"));
    }

    #[test]
    fn test_text_extensions_sorted() {
        let mut sorted = TEXT_EXTENSIONS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, TEXT_EXTENSIONS);
    }

    #[test]
    fn test_guard_extension() {
        assert!(guard_extension("txt").is_ok());
        assert!(matches!(guard_extension(".txt"), Err(Error::BadExtension(_))));
        assert!(guard_extension("").is_err());
    }

    #[test]
    fn test_try_create_file_only_for_text() {
        let dir = tempdir().unwrap();
        let txt = dir.path().join("nested").join("a.txt");
        let png = dir.path().join("a.png");
        assert!(try_create_file(&txt, true).unwrap());
        assert!(txt.exists());
        assert!(is_empty_file(&txt));
        assert!(!try_create_file(&png, true).unwrap());
        assert!(!png.exists());
        assert!(!try_create_file(&dir.path().join("b.txt"), false).unwrap());
    }

    #[test]
    fn test_delete_if_empty() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty.txt");
        let full = dir.path().join("full.txt");
        fs::write(&empty, "").unwrap();
        fs::write(&full, "x").unwrap();
        delete_if_empty(&empty).unwrap();
        delete_if_empty(&full).unwrap();
        delete_if_empty(&dir.path().join("missing.txt")).unwrap();
        assert!(!empty.exists());
        assert!(full.exists());
    }

    #[test]
    fn test_accept_received_and_find() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        let received = sub.join("Case.received.txt");
        fs::write(&received, "new").unwrap();
        fs::write(sub.join("Case.verified.txt"), "old").unwrap();
        fs::write(dir.path().join("Other.verified.txt"), "x").unwrap();

        assert_eq!(find_received_files(dir.path()), vec![received.clone()]);

        let verified = accept_received(&received).unwrap();
        assert_eq!(verified, sub.join("Case.verified.txt"));
        assert_eq!(fs::read_to_string(&verified).unwrap(), "new");
        assert!(!received.exists());
        assert!(find_received_files(dir.path()).is_empty());
    }
}
