use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::files;
use crate::verify::engine::NotEqualFile;
use crate::verify::file_pair::FilePair;

/// Builds the message a failed verification reports.
pub struct FailureReport<'a> {
    pub test_name: Option<&'a str>,
    pub test_case: Option<&'a str>,
    pub directory: &'a Path,
    pub new_files: &'a [FilePair],
    pub not_equal_files: &'a [NotEqualFile],
    pub deleted_files: &'a [PathBuf],
    pub equal_files: &'a [FilePair],
    pub omit_content: bool,
}

impl FailureReport<'_> {
    pub fn build(&self) -> String {
        let mut out = String::from("\n");

        if let Some(name) = self.test_name.filter(|n| !n.is_empty()) {
            let _ = writeln!(out, "Test Name: {}", name);
        }
        if let Some(case) = self.test_case.filter(|c| !c.is_empty()) {
            let _ = writeln!(out, "Test Case: {}", case);
        }
        let _ = writeln!(out, "Directory: {}", self.directory.display());

        if !self.new_files.is_empty() {
            out.push_str("New:\n");
            for file in self.new_files {
                append_file(&mut out, file);
            }
        }

        if !self.not_equal_files.is_empty() {
            out.push_str("NotEqual:\n");
            for item in self.not_equal_files {
                append_file(&mut out, &item.file);
            }
        }

        if !self.deleted_files.is_empty() {
            out.push_str("Delete:\n");
            for path in self.deleted_files {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let _ = writeln!(out, "  - {}", name);
            }
        }

        if !self.equal_files.is_empty() {
            out.push_str("Equal:\n");
            for file in self.equal_files {
                append_file(&mut out, file);
            }
        }

        if !self.omit_content {
            self.append_content(&mut out);
        }
        out
    }

    fn append_content(&self, out: &mut String) {
        let new_files: Vec<&FilePair> = self.new_files.iter().filter(|f| f.is_text).collect();
        let not_equal: Vec<&NotEqualFile> = self
            .not_equal_files
            .iter()
            .filter(|f| f.file.is_text || f.message.as_deref().is_some_and(|m| !m.is_empty()))
            .collect();

        if new_files.is_empty() && not_equal.is_empty() {
            return;
        }

        out.push_str("\n\nFileContent:\n\n");

        if !new_files.is_empty() {
            out.push_str("New:\n\n");
            for file in new_files {
                let _ = writeln!(out, "Received: {}", file.received_name);
                out.push_str(&files::read_text_lossy(&file.received_path));
                out.push('\n');
            }
        }

        if !not_equal.is_empty() {
            out.push_str("NotEqual:\n\n");
            for item in not_equal {
                match item.message.as_deref().filter(|m| !m.is_empty()) {
                    None => {
                        let _ = writeln!(out, "Received: {}", item.file.received_name);
                        out.push_str(&files::read_text_lossy(&item.file.received_path));
                        out.push('\n');
                        let _ = writeln!(out, "Verified: {}", item.file.verified_name);
                        out.push_str(&files::read_text_lossy(&item.file.verified_path));
                        out.push('\n');
                    }
                    Some(message) => {
                        let _ = writeln!(out, "Received: {}", item.file.received_name);
                        let _ = writeln!(out, "Verified: {}", item.file.verified_name);
                        let _ = writeln!(out, "Compare Result: {}", message);
                    }
                }
                out.push('\n');
            }
        }
    }
}

fn append_file(out: &mut String, file: &FilePair) {
    let _ = writeln!(out, "  - Received: {}", file.received_name);
    let _ = writeln!(out, "    Verified: {}", file.verified_name);
}
