//! Atomic replacement of the output file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

/// Writes `contents` to `path` so readers see either the old or the new file.
///
/// The data goes to a temporary sibling first, is flushed to disk, then
/// renamed over the destination. Missing parent directories are created.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let temp_path = temp_path_for(path)?;
    let result = write_and_sync(&temp_path, contents).and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        if let Err(e) = fs::remove_file(&temp_path) {
            debug!(path = %temp_path.display(), "could not remove temporary file: {e}");
        }
    }
    result?;

    debug!(path = %path.display(), bytes = contents.len(), "replaced output file");
    Ok(())
}

fn write_and_sync(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

/// `dir/.name.tmp-<pid>`, next to the destination so the rename stays on one filesystem.
fn temp_path_for(path: &Path) -> io::Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path {} has no file name", path.display()),
        )
    })?;
    let temp_name = format!(".{}.tmp-{}", file_name.to_string_lossy(), std::process::id());
    Ok(path.with_file_name(temp_name))
}
