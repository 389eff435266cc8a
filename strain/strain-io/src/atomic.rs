//! Write-then-rename file output.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{IoError, IoResult};

/// Writes `contents` to a temporary file next to `path`, then renames it
/// into place. On error nothing is left at `path`.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> IoResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| IoError::Io(e.error))?;
    Ok(())
}
