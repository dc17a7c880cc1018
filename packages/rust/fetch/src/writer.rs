//! Persisting extracted text.

use std::path::Path;

use tracing::info;

use distill_shared::{DistillError, Result};

/// Write `text` to `path`, creating any missing parent directories.
/// An existing file is replaced.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| DistillError::io(parent, e))?;
    }

    std::fs::write(path, text).map_err(|e| DistillError::io(path, e))?;
    info!(path = %path.display(), chars = text.chars().count(), "wrote extracted text");

    Ok(())
}
