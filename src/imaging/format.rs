//! Save-format negotiation and destination checks.
//!
//! The codec for a save is resolved by precedence:
//!
//! 1. an explicit format argument,
//! 2. the destination's file extension (lower-cased),
//! 3. the image's current format,
//! 4. [`DEFAULT_FORMAT`].

use crate::error::{Error, Result};
use std::path::Path;

pub const DEFAULT_FORMAT: &str = "jpg";

/// Report `jpg` as `jpeg`; everything else passes through.
pub fn normalize_format(format: &str) -> String {
    if format == "jpg" {
        "jpeg".to_string()
    } else {
        format.to_string()
    }
}

/// Lower-cased extension of `path`, without the dot. `None` when missing or empty.
pub fn format_from_filename(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
}

/// Pick the codec name for a save.
pub fn resolve_save_format(
    explicit: Option<&str>,
    filename: Option<&Path>,
    image_format: Option<&str>,
) -> String {
    explicit
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase)
        .or_else(|| filename.and_then(format_from_filename))
        .or_else(|| image_format.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FORMAT.to_string())
}

/// Fail with [`Error::SaveFailure`] unless the directory that will hold
/// `path` exists and is writable.
pub fn ensure_path_is_writable(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let dir = parent.canonicalize().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::SaveFailure(format!(
            "non-existent path component in {}",
            path.display()
        )),
        _ => Error::SaveFailure(format!("{}: {}", path.display(), e)),
    })?;
    let metadata = std::fs::metadata(&dir)
        .map_err(|e| Error::SaveFailure(format!("{}: {}", dir.display(), e)))?;
    if !metadata.is_dir() {
        return Err(Error::SaveFailure(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    // Permission bits don't say whether this process may write; try it
    tempfile::tempfile_in(&dir).map_err(|e| {
        Error::SaveFailure(format!("directory {} is not writable: {}", dir.display(), e))
    })?;
    Ok(())
}
