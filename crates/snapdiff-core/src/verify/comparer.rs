use std::fs;

use tracing::debug;

use crate::error::Result;
use crate::files;
use crate::verify::file_pair::FilePair;
use crate::verify::scrubber::fix_newlines;
use crate::verify::settings::VerifySettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equality {
    New,
    Equal,
    NotEqual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityResult {
    pub equality: Equality,
    pub message: Option<String>,
}

impl EqualityResult {
    fn of(equality: Equality) -> Self {
        Self {
            equality,
            message: None,
        }
    }
}

/// Outcome of a custom comparer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareResult {
    pub is_equal: bool,
    pub message: Option<String>,
}

impl CompareResult {
    pub fn equal() -> Self {
        Self {
            is_equal: true,
            message: None,
        }
    }

    pub fn not_equal(message: Option<String>) -> Self {
        Self {
            is_equal: false,
            message,
        }
    }
}

/// Compares scrubbed text against the verified file, writing the received file on any difference.
pub fn compare_text(pair: &FilePair, received: &str, settings: &VerifySettings) -> Result<EqualityResult> {
    files::delete_if_empty(&pair.verified_path)?;
    if !pair.verified_path.exists() {
        fs::write(&pair.received_path, received)?;
        return Ok(EqualityResult::of(Equality::New));
    }

    let verified = fix_newlines(&String::from_utf8_lossy(&fs::read(&pair.verified_path)?));
    let result = compare_strings(&pair.extension, received, &verified, settings);
    if result.is_equal {
        return Ok(EqualityResult::of(Equality::Equal));
    }

    debug!("Text differs for {}", pair.verified_name);
    fs::write(&pair.received_path, received)?;
    Ok(EqualityResult {
        equality: Equality::NotEqual,
        message: result.message,
    })
}

fn compare_strings(extension: &str, received: &str, verified: &str, settings: &VerifySettings) -> CompareResult {
    if received == verified {
        return CompareResult::equal();
    }
    match settings.string_comparer_for(extension) {
        Some(comparer) => comparer(received, verified),
        None => CompareResult::not_equal(None),
    }
}

/// Byte comparison for binary targets.
///
/// When an earlier text target of the same run already failed, the pair is reported as
/// changed without comparing so it shows up next to the text diff.
pub fn compare_binary(
    pair: &FilePair,
    received: &[u8],
    settings: &VerifySettings,
    previous_text_failed: bool,
) -> Result<EqualityResult> {
    files::delete_if_empty(&pair.verified_path)?;
    if !pair.verified_path.exists() {
        fs::write(&pair.received_path, received)?;
        return Ok(EqualityResult::of(Equality::New));
    }

    if !previous_text_failed {
        let verified = fs::read(&pair.verified_path)?;
        let result = if verified == received {
            CompareResult::equal()
        } else {
            match settings.stream_comparer_for(&pair.extension) {
                Some(comparer) => comparer(received, &verified),
                None => CompareResult::not_equal(None),
            }
        };
        if result.is_equal {
            return Ok(EqualityResult::of(Equality::Equal));
        }
        fs::write(&pair.received_path, received)?;
        return Ok(EqualityResult {
            equality: Equality::NotEqual,
            message: result.message,
        });
    }

    fs::write(&pair.received_path, received)?;
    Ok(EqualityResult::of(Equality::NotEqual))
}
