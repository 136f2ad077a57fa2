use crate::error::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Create `path` and any missing parents
pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        debug!("Cache directory ready: {}", path.display());
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    info!("Created directory: {}", path.display());
    Ok(())
}

/// Remove a file if it is still there
pub fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}
