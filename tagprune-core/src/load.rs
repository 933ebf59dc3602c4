//! Reading and writing the dump file.
//!
//! The dump is handled as plain text. Reads never fail on bad encoding;
//! writes go through a temp file and a rename so an interrupted run leaves
//! the previous dump in place.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{IoResultExt, TagpruneResult};
use crate::logging::log_warn;

/// Decodes raw bytes as UTF-8, substituting invalid sequences when strict
/// decoding fails. Returns the text and whether the lossy path was taken.
pub fn decode_text(bytes: Vec<u8>) -> (String, bool) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, false),
        Err(e) => (String::from_utf8_lossy(e.as_bytes()).into_owned(), true),
    }
}

/// Reads the whole dump as text.
pub fn load_dump(path: &Path) -> TagpruneResult<String> {
    let bytes = fs::read(path).with_path(path)?;
    let (text, lossy) = decode_text(bytes);
    if lossy {
        log_warn(&format!(
            "{} is not valid UTF-8; invalid sequences were replaced",
            path.display()
        ));
    }
    Ok(text)
}

const TEMP_SUFFIX: &str = ".tmp";

/// Name of the temp file `write_dump` stages `file_name` in:
/// `.<file_name>.<pid>.<nanos>.tmp`.
fn write_temp_name(file_name: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!(".{}.{}.{}{}", file_name, std::process::id(), nanos, TEMP_SUFFIX)
}

/// Whether `name` is a temp file left behind by a write to `file_name`.
pub fn is_write_temp(name: &str, file_name: &str) -> bool {
    name.strip_prefix('.')
        .and_then(|rest| rest.strip_prefix(file_name))
        .is_some_and(|rest| rest.starts_with('.') && rest.ends_with(TEMP_SUFFIX))
}

/// Replaces the dump at `path` with `text`.
pub fn write_dump(path: &Path, text: &str) -> TagpruneResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dump".to_string());

    let temp_path = dir.join(write_temp_name(&file_name));

    fs::write(&temp_path, text).with_path(&temp_path)?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e).with_path(path);
    }
    Ok(())
}
